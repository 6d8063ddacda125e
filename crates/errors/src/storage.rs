//! Storage and filesystem-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StorageError {
    #[error("failed to create directory {path}: {message}")]
    CreateDirFailed { path: String, message: String },

    #[error("failed to remove directory {path}: {message}")]
    RemoveDirFailed { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Check permissions and free space under the output directory.")
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CreateDirFailed { .. } => "storage.create_dir_failed",
            Self::RemoveDirFailed { .. } => "storage.remove_dir_failed",
            Self::WriteFailed { .. } => "storage.write_failed",
        };
        Some(code)
    }
}
