//! Configuration and build-request validation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    /// A build-request field has the wrong shape.
    #[error("invalid build request: {field} {expected}")]
    InvalidField { field: String, expected: String },

    /// `clean` was requested on an absolute output directory without opt-in.
    #[error(
        "outputDir may not be an absolute path when clean is true, as a precaution against \
         unintentional deletion of important directories. To bypass this precaution, set \
         absoluteDir: true in your config"
    )]
    AbsoluteCleanRefused { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl ConfigError {
    /// Shorthand for a field-shape violation
    pub fn invalid_field(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Pass the configuration file path or create shared-deps.json.")
            }
            Self::AbsoluteCleanRefused { .. } => {
                Some("Use a relative outputDir or set absoluteDir: true.")
            }
            Self::InvalidField { .. } | Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the build.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::InvalidField { .. } => "config.invalid_field",
            Self::AbsoluteCleanRefused { .. } => "config.absolute_clean_refused",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
        };
        Some(code)
    }
}
