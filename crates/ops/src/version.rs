//! One version unit: skip probe, download and filtered extraction

use shdeps_errors::{Error, NetworkError};
use shdeps_events::{EventEmitter, EventSender, FailureContext, VersionEvent};
use shdeps_resolver::ResolvedVersion;
use shdeps_store::{ensure_dir, extract_tarball, version_dir, PathFilter};
use shdeps_types::{BuildRequest, VersionOutcome, VersionReport};
use std::io;
use std::sync::Arc;

use crate::BuildContext;

/// Mirror a single resolved version.
///
/// Every failure is reported as a fatal `VersionEvent::Failed` before it is
/// returned.
pub(crate) async fn process_version(
    ctx: BuildContext,
    request: Arc<BuildRequest>,
    name: String,
    resolved: ResolvedVersion,
    tx: EventSender,
) -> Result<VersionReport, Error> {
    let result = mirror_version(&ctx, &request, &name, &resolved, &tx).await;

    if let Err(e) = &result {
        tracing::debug!(package = %name, version = %resolved.version, error = %e, "version failed");
        tx.emit_version(VersionEvent::Failed {
            name: name.clone(),
            version: resolved.version.clone(),
            failure: FailureContext::from_error(e),
        });
    }
    result
}

async fn mirror_version(
    ctx: &BuildContext,
    request: &BuildRequest,
    name: &str,
    resolved: &ResolvedVersion,
    tx: &EventSender,
) -> Result<VersionReport, Error> {
    let version = resolved.version.clone();
    let key = format!("{name}@{version}");

    if let Some(base) = &request.skip_mirror_url {
        let url = shdeps_net::join_url(base, &format!("{key}/package.json"));
        if shdeps_net::probe_exists(&ctx.net, &url).await? {
            tx.emit_version(VersionEvent::Skipped {
                name: name.to_string(),
                version: version.clone(),
                url: url.clone(),
            });
            return Ok(VersionReport {
                version,
                outcome: VersionOutcome::Skipped { url },
            });
        }
    }

    tx.emit_version(VersionEvent::Downloading {
        name: name.to_string(),
        version: version.clone(),
    });

    let dest = version_dir(&request.output_dir, name, &version);
    ensure_dir(&dest).await?;
    let filter = PathFilter::new(&resolved.filters)?;

    let stream = shdeps_net::open_stream(&ctx.net, &resolved.tarball, &key).await?;

    let events = tx.clone();
    let (event_name, event_version) = (name.to_string(), version.clone());
    let files = extract_tarball(stream, &dest, filter, move |path| {
        events.emit_version(VersionEvent::FileExtracted {
            name: event_name.clone(),
            version: event_version.clone(),
            path: path.to_string(),
        });
    })
    .await
    .map_err(|e| download_timeout(e, &key))?;

    tracing::debug!(package = %key, files = files.len(), "extracted archive");
    Ok(VersionReport {
        version,
        outcome: VersionOutcome::Mirrored { files },
    })
}

/// A body that stops arriving in time is a timed-out download
fn download_timeout(error: Error, key: &str) -> Error {
    match error {
        Error::Io {
            kind: io::ErrorKind::TimedOut,
            ..
        } => NetworkError::DownloadTimeout {
            package: key.to_string(),
        }
        .into(),
        other => other,
    }
}
