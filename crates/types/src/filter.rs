//! Include/exclude glob filters for archive entries

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use shdeps_errors::ArchiveError;

/// Effective include/exclude patterns for one package version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl FilterSet {
    /// Layer `overrides` on top of these defaults, field by field
    #[must_use]
    pub fn overridden_by(&self, overrides: &FilterSet) -> FilterSet {
        FilterSet {
            include: overrides.include.clone().or_else(|| self.include.clone()),
            exclude: overrides.exclude.clone().or_else(|| self.exclude.clone()),
        }
    }

    /// Whether neither field was given
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

/// Compile glob patterns with micromatch-like semantics: `*` stops at `/`,
/// `**` crosses directories. Empty input compiles to `None`.
///
/// # Errors
///
/// Returns an error naming the first pattern that is not a valid glob.
pub fn compile_globs(patterns: &[String]) -> Result<Option<GlobSet>, ArchiveError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ArchiveError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ArchiveError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })
}
