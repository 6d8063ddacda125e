//! Per-entry keep/drop decisions for archive extraction

use globset::GlobSet;
use shdeps_errors::ArchiveError;
use shdeps_types::{compile_globs, FilterSet};
use std::path::Path;

const LICENSE_NAMES: [&str; 3] = ["license", "license.md", "license.txt"];

/// Compiled include/exclude patterns for one version
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    /// Compile a filter set. Absent or empty lists impose no constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn new(filters: &FilterSet) -> Result<Self, ArchiveError> {
        Ok(Self {
            include: compile_globs(filters.include.as_deref().unwrap_or_default())?,
            exclude: compile_globs(filters.exclude.as_deref().unwrap_or_default())?,
        })
    }

    /// Decide whether an entry path, relative to the package root, is kept.
    ///
    /// `package.json` and license files are always kept.
    #[must_use]
    pub fn keeps(&self, path: &str) -> bool {
        if is_package_json(path) || is_license(path) {
            return true;
        }

        let included = self.include.as_ref().is_none_or(|set| set.is_match(path));
        let excluded = self.exclude.as_ref().is_some_and(|set| set.is_match(path));
        included && !excluded
    }
}

fn is_package_json(path: &str) -> bool {
    path.eq_ignore_ascii_case("package.json")
}

fn is_license(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| LICENSE_NAMES.iter().any(|l| name.eq_ignore_ascii_case(l)))
}
