use serde::{Deserialize, Serialize};

use crate::EventSource;
use shdeps_errors::UserFacingError;
use shdeps_types::Severity;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod build;
pub mod package;
pub mod version;

pub use build::BuildEvent;
pub use package::PackageEvent;
pub use version::VersionEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Whole-run milestones
    Build(BuildEvent),

    /// Metadata fetch and version matching for one package
    Package(PackageEvent),

    /// Skip probe, download and extraction of one version
    Version(VersionEvent),
}

impl AppEvent {
    /// Identify the source domain for this event
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::Build(_) => EventSource::BUILD,
            Self::Package(_) => EventSource::PACKAGE,
            Self::Version(_) => EventSource::VERSION,
        }
    }

    /// Severity used by the aggregator
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Build(event) => event.severity(),
            Self::Package(event) => event.severity(),
            Self::Version(event) => event.severity(),
        }
    }

    /// The line shown to the user
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Build(event) => event.message(),
            Self::Package(event) => event.message(),
            Self::Version(event) => event.message(),
        }
    }

    /// `name` for package events, `name@version` for version events
    #[must_use]
    pub fn correlation_id(&self) -> Option<String> {
        match self {
            Self::Build(_) => None,
            Self::Package(event) => Some(event.name().to_string()),
            Self::Version(event) => Some(event.key()),
        }
    }
}
