//! Build request model
//!
//! A [`BuildRequest`] is produced once by the config validator and stays
//! immutable for the whole run.

use crate::{FilterSet, Severity, VersionRange};
use semver::Version;
use std::fmt;
use std::path::PathBuf;

/// Default output directory when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "npm";

/// A validated, normalized build request
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub output_dir: PathBuf,
    pub clean: bool,
    pub absolute_dir: bool,
    pub log_level: Severity,
    pub skip_mirror_url: Option<String>,
    pub generate_deployment_file: bool,
    pub packages: Vec<PackageSpec>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            clean: false,
            absolute_dir: false,
            log_level: Severity::Debug,
            skip_mirror_url: None,
            generate_deployment_file: false,
            packages: Vec::new(),
        }
    }
}

/// One package to mirror
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub name: String,
    pub versions: Vec<VersionSpec>,
    /// Package-level include/exclude defaults
    pub filters: FilterSet,
}

impl PackageSpec {
    /// A package with plain range specifiers and no filters
    #[must_use]
    pub fn new(name: impl Into<String>, versions: Vec<VersionSpec>) -> Self {
        Self {
            name: name.into(),
            versions,
            filters: FilterSet::default(),
        }
    }

    /// Set the package-level filters
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Effective filters for a resolved version.
    ///
    /// The first exact specifier naming this version supplies the override;
    /// otherwise the package-level defaults apply.
    #[must_use]
    pub fn filters_for(&self, version: &Version) -> FilterSet {
        self.versions
            .iter()
            .find_map(|spec| match spec {
                VersionSpec::Exact { filters, .. } if spec.matches(version) => Some(filters),
                _ => None,
            })
            .map_or_else(
                || self.filters.clone(),
                |overrides| self.filters.overridden_by(overrides),
            )
    }
}

/// A requested version: a range string or an exact version with filters
#[derive(Debug, Clone)]
pub enum VersionSpec {
    Range(VersionRange),
    Exact { version: Version, filters: FilterSet },
}

impl VersionSpec {
    /// Check whether a published version satisfies this specifier
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Range(range) => range.matches(version),
            Self::Exact { version: wanted, .. } => VersionRange::exact(wanted).matches(version),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(range) => write!(f, "{range}"),
            Self::Exact { version, .. } => write!(f, "{version}"),
        }
    }
}
