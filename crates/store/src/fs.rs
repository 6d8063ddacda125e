//! Idempotent directory helpers

use shdeps_errors::{Error, StorageError};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Create a directory and its parents; an existing directory is fine
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| StorageError::CreateDirFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(())
}

/// Recursively remove a directory; a missing directory is fine
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub async fn remove_dir_all(path: &Path) -> Result<(), Error> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::RemoveDirFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()),
    }
}

/// Write a file, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, contents)
        .await
        .map_err(|e| StorageError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(())
}
