#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Version resolution for shdeps
//!
//! Selects the published versions of a package that satisfy at least one of
//! its requested specifiers. The result keeps the registry document's order;
//! it is never re-sorted.

use shdeps_errors::ResolutionError;
use shdeps_registry::{Packument, VersionMetadata};
use shdeps_types::{FilterSet, PackageSpec, Version};

/// A concrete published version selected for mirroring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Version string exactly as the registry lists it
    pub version: String,
    /// Archive URL from `dist.tarball`
    pub tarball: String,
    /// Effective include/exclude for this version
    pub filters: FilterSet,
}

/// Published version keys satisfying at least one specifier, in document
/// order. Keys that are not valid semantic versions never match.
#[must_use]
pub fn matching_versions<'a>(spec: &PackageSpec, packument: &'a Packument) -> Vec<&'a str> {
    matches(spec, packument).into_iter().map(|(key, _)| key).collect()
}

fn matches<'a>(spec: &PackageSpec, packument: &'a Packument) -> Vec<(&'a str, Version)> {
    packument
        .version_keys()
        .filter_map(|key| Version::parse(key).ok().map(|v| (key, v)))
        .filter(|(_, v)| spec.versions.iter().any(|s| s.matches(v)))
        .collect()
}

/// Resolve a package's specifiers against its metadata
///
/// # Errors
///
/// Returns `NoMatchingVersions` when nothing matches, or `InvalidMetadata`
/// when a matched version has no archive URL.
pub fn resolve_versions(
    spec: &PackageSpec,
    packument: &Packument,
) -> Result<Vec<ResolvedVersion>, ResolutionError> {
    let matched = matches(spec, packument);
    if matched.is_empty() {
        return Err(ResolutionError::NoMatchingVersions {
            name: spec.name.clone(),
        });
    }

    let resolved = matched
        .into_iter()
        .map(|(key, version)| {
            let tarball = packument
                .version(key)
                .and_then(VersionMetadata::tarball)
                .ok_or_else(|| ResolutionError::InvalidMetadata {
                    name: spec.name.clone(),
                    message: format!("version {key} has no dist.tarball"),
                })?;

            Ok(ResolvedVersion {
                version: key.to_string(),
                tarball: tarball.to_string(),
                filters: spec.filters_for(&version),
            })
        })
        .collect::<Result<Vec<_>, ResolutionError>>()?;

    tracing::debug!(
        package = %spec.name,
        matched = resolved.len(),
        "resolved versions"
    );
    Ok(resolved)
}
