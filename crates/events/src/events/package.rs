use serde::{Deserialize, Serialize};
use shdeps_types::Severity;

use super::FailureContext;

/// Events for the metadata and matching stage of one package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PackageEvent {
    Started {
        name: String,
    },
    /// The underlying error of a failed metadata fetch, reported before the
    /// fatal `NotFound`
    MetadataFailed {
        name: String,
        failure: FailureContext,
    },
    NotFound {
        name: String,
    },
    VersionsMatched {
        name: String,
        versions: Vec<String>,
    },
    NoMatchingVersions {
        name: String,
    },
    /// Resolution failed after metadata was fetched
    Failed {
        name: String,
        failure: FailureContext,
    },
}

impl PackageEvent {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Started { name }
            | Self::MetadataFailed { name, .. }
            | Self::NotFound { name }
            | Self::VersionsMatched { name, .. }
            | Self::NoMatchingVersions { name }
            | Self::Failed { name, .. } => name,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::VersionsMatched { .. } => Severity::Debug,
            Self::Started { .. } | Self::MetadataFailed { .. } => Severity::Warn,
            Self::NotFound { .. } | Self::NoMatchingVersions { .. } | Self::Failed { .. } => {
                Severity::Fatal
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Started { name } => format!("--> {name}"),
            Self::MetadataFailed { failure, .. } => failure.message.clone(),
            Self::Failed { name, failure } => format!("----> Failed {name}: {}", failure.message),
            Self::NotFound { name } => {
                format!("----> No package '{name}' found in the npm registry")
            }
            Self::VersionsMatched { versions, .. } => {
                format!("----> Matched versions: {}", versions.join(", "))
            }
            Self::NoMatchingVersions { .. } => "----> No matching versions".to_string(),
        }
    }
}
