use serde::{Deserialize, Serialize};
use shdeps_types::Severity;

use super::FailureContext;

/// Events for the skip probe, download and extraction of one version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VersionEvent {
    Skipped {
        name: String,
        version: String,
        url: String,
    },
    Downloading {
        name: String,
        version: String,
    },
    FileExtracted {
        name: String,
        version: String,
        path: String,
    },
    Failed {
        name: String,
        version: String,
        failure: FailureContext,
    },
}

impl VersionEvent {
    /// `name@version` of the unit that emitted this event
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Skipped { name, version, .. }
            | Self::Downloading { name, version }
            | Self::FileExtracted { name, version, .. }
            | Self::Failed { name, version, .. } => format!("{name}@{version}"),
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::FileExtracted { .. } => Severity::Debug,
            Self::Skipped { .. } | Self::Downloading { .. } => Severity::Warn,
            Self::Failed { .. } => Severity::Fatal,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Skipped { name, version, url } => format!(
                "----> Skipping {name}@{version} because it is already available at URL {url}"
            ),
            Self::Downloading { name, version } => {
                format!("----> Downloading and extracting {name}@{version}")
            }
            Self::FileExtracted { path, .. } => format!("------> {path}"),
            Self::Failed {
                name,
                version,
                failure,
            } => format!("----> Failed {name}@{version}: {}", failure.message),
        }
    }
}
