//! Version resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("No package '{name}' found in the npm registry")]
    PackageNotFound { name: String },

    #[error("No matching versions for {name}")]
    NoMatchingVersions { name: String },

    #[error("invalid metadata for {name}: {message}")]
    InvalidMetadata { name: String, message: String },
}

impl UserFacingError for ResolutionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageNotFound { .. } => Some("Check the package name and the registry URL."),
            Self::NoMatchingVersions { .. } => {
                Some("Relax the requested range or check the package's published versions.")
            }
            Self::InvalidMetadata { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::PackageNotFound { .. } => "resolution.package_not_found",
            Self::NoMatchingVersions { .. } => "resolution.no_matching_versions",
            Self::InvalidMetadata { .. } => "resolution.invalid_metadata",
        };
        Some(code)
    }
}
