#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for shdeps
//!
//! This crate provides the validated build request model, npm-style version
//! ranges, archive filters and the reports produced by a build.

pub mod filter;
pub mod reports;
pub mod request;
pub mod version;

// Re-export commonly used types
pub use filter::{compile_globs, FilterSet};
pub use reports::{BuildReport, PackageReport, VersionOutcome, VersionReport};
pub use request::{BuildRequest, PackageSpec, VersionSpec, DEFAULT_OUTPUT_DIR};
pub use semver::Version;
pub use version::{Comparator, Op, VersionRange};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a build log message, ordered `debug < warn < fatal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Warn,
    Fatal,
}

impl Severity {
    /// Numeric rank used for threshold comparisons
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Warn => 1,
            Self::Fatal => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Warn => "warn",
            Self::Fatal => "fatal",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Debug
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "warn" => Ok(Self::Warn),
            "fatal" => Ok(Self::Fatal),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

// Implement clap::ValueEnum for Severity
impl clap::ValueEnum for Severity {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Debug, Self::Warn, Self::Fatal]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}
