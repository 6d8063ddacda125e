//! Archive extraction error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("unsafe archive entry path: {path}")]
    UnsafePath { path: String },

    #[error("invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl UserFacingError for ArchiveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ExtractionFailed { .. } => "archive.extraction_failed",
            Self::UnsafePath { .. } => "archive.unsafe_path",
            Self::InvalidPattern { .. } => "archive.invalid_pattern",
        };
        Some(code)
    }
}
