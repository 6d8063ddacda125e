use serde::{Deserialize, Serialize};
use shdeps_types::Severity;

/// Whole-run build milestones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    Started { package_count: usize },
    DeploymentFileCreated { output_dir: String },
    Finished { duration_ms: u64 },
}

impl BuildEvent {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Started { .. } | Self::DeploymentFileCreated { .. } | Self::Finished { .. } => {
                Severity::Warn
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Started { package_count } => {
                format!("Building {package_count} packages concurrently")
            }
            Self::DeploymentFileCreated { output_dir } => {
                format!("Creating {output_dir}/Dockerfile")
            }
            Self::Finished { duration_ms } => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = *duration_ms as f64 / 1000.0;
                format!("Finished build in {seconds} seconds")
            }
        }
    }
}
