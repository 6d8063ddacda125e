//! Report type definitions for build runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one resolved version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VersionOutcome {
    /// Downloaded and extracted into the output directory
    Mirrored { files: Vec<String> },
    /// Already present at the skip mirror
    Skipped { url: String },
}

/// Per-version report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VersionReport {
    pub version: String,
    #[serde(flatten)]
    pub outcome: VersionOutcome,
}

/// Per-package report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageReport {
    pub name: String,
    pub versions: Vec<VersionReport>,
}

impl PackageReport {
    /// Versions that were downloaded and extracted
    pub fn mirrored(&self) -> impl Iterator<Item = &VersionReport> {
        self.versions
            .iter()
            .filter(|v| matches!(v.outcome, VersionOutcome::Mirrored { .. }))
    }

    /// Versions that were skipped because the mirror already had them
    pub fn skipped(&self) -> impl Iterator<Item = &VersionReport> {
        self.versions
            .iter()
            .filter(|v| matches!(v.outcome, VersionOutcome::Skipped { .. }))
    }
}

/// Whole-run report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildReport {
    /// Output root
    pub output_dir: PathBuf,
    /// Packages in request order
    pub packages: Vec<PackageReport>,
    /// Rendered deployment file, if one was requested
    pub deployment_file: Option<PathBuf>,
    /// Total execution time
    pub duration_ms: u64,
}

impl BuildReport {
    /// Total number of extracted files across all versions
    #[must_use]
    pub fn files_extracted(&self) -> usize {
        self.packages
            .iter()
            .flat_map(|p| p.versions.iter())
            .map(|v| match &v.outcome {
                VersionOutcome::Mirrored { files } => files.len(),
                VersionOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}
