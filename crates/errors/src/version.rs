//! Version range parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version range: {input}")]
    InvalidRange { input: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRange { .. } => {
                Some("Use npm range syntax such as ^17.0.0, >=16 <18, 17.x or 1.2.3 - 1.4.0.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRange { .. } => Some("version.invalid_range"),
        }
    }
}
