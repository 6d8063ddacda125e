//! Streaming extraction of gzip-compressed package tarballs
//!
//! The body stream is decoded and unpacked as it arrives; the archive is
//! never buffered whole in memory or written to disk.

use async_compression::tokio::bufread::GzipDecoder;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use shdeps_errors::{ArchiveError, Error, StorageError};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tokio_util::io::{StreamReader, SyncIoBridge};
use tokio_util::sync::CancellationToken;

use crate::PathFilter;

/// Extract the kept entries of a `.tgz` stream into `dest`.
///
/// The single top-level wrapper directory (`package/` for npm) is stripped.
/// Entries with absolute paths or `..` components are skipped, as are
/// links and other non-file entries. `on_file` is called with each kept
/// relative path as soon as it is written. Returns the kept paths in archive
/// order.
///
/// Dropping the returned future stops the blocking extraction at the next
/// entry and ends the body stream.
///
/// # Errors
///
/// Returns an error if the stream fails, the data is not a valid gzip tar,
/// or a file cannot be written. A stalled or timed-out stream surfaces as an
/// I/O error of kind `TimedOut`.
pub async fn extract_tarball<S, F>(
    stream: S,
    dest: &Path,
    filter: PathFilter,
    on_file: F,
) -> Result<Vec<String>, Error>
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    F: FnMut(&str) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let body = Box::pin(stream.take_until(cancel.clone().cancelled_owned()));
    let reader = SyncIoBridge::new(GzipDecoder::new(StreamReader::new(body)));
    let unpack = Unpack {
        dest: dest.to_path_buf(),
        filter,
        cancel,
    };

    tokio::task::spawn_blocking(move || unpack.run(reader, on_file))
        .await
        .map_err(|e| Error::internal(format!("extract task failed: {e}")))?
}

struct Unpack {
    dest: PathBuf,
    filter: PathFilter,
    cancel: CancellationToken,
}

impl Unpack {
    fn run<R: Read>(&self, reader: R, on_file: impl FnMut(&str)) -> Result<Vec<String>, Error> {
        // a cancelled body ends early and surfaces as a truncated archive
        self.entries(reader, on_file).map_err(|e| {
            if self.cancel.is_cancelled() {
                Error::Cancelled
            } else {
                e
            }
        })
    }

    fn entries<R: Read>(
        &self,
        reader: R,
        mut on_file: impl FnMut(&str),
    ) -> Result<Vec<String>, Error> {
        let mut archive = Archive::new(reader);
        let mut kept = Vec::new();

        for entry in archive.entries().map_err(read_error)? {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let mut entry = entry.map_err(read_error)?;
            let raw = entry.path().map_err(read_error)?.into_owned();

            let relative = match strip_wrapper(&raw) {
                Ok(Some(relative)) => relative,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping archive entry");
                    continue;
                }
            };

            if !matches!(
                entry.header().entry_type(),
                EntryType::Regular | EntryType::Continuous
            ) {
                continue;
            }

            let display = to_slash(&relative);
            if !self.filter.keeps(&display) {
                continue;
            }

            let target = self.dest.join(&relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirFailed {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
            entry.unpack(&target).map_err(|e| write_error(e, &target))?;

            on_file(&display);
            kept.push(display);
        }

        Ok(kept)
    }
}

/// Drop the first path component and validate the rest.
///
/// `Ok(None)` means nothing is left (the wrapper directory itself).
fn strip_wrapper(raw: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    let unsafe_path = || ArchiveError::UnsafePath {
        path: raw.display().to_string(),
    };

    let mut components = raw.components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        Some(Component::CurDir) => return strip_wrapper(components.as_path()),
        None => return Ok(None),
        Some(_) => return Err(unsafe_path()),
    }

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path())
            }
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::TimedOut {
        return e.into();
    }
    ArchiveError::ExtractionFailed {
        message: e.to_string(),
    }
    .into()
}

fn write_error(e: io::Error, path: &Path) -> Error {
    // unpack also reads the entry body from the stream
    if e.kind() == io::ErrorKind::TimedOut {
        return e.into();
    }
    StorageError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    }
    .into()
}
