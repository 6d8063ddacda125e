//! One package unit: metadata, matching and its version units

use shdeps_config::acquire_semaphore_permit;
use shdeps_errors::{Error, ResolutionError};
use shdeps_events::{channel, EventEmitter, EventSender, FailureContext, PackageEvent};
use shdeps_resolver::resolve_versions;
use shdeps_types::{BuildRequest, PackageReport, PackageSpec, Severity};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::units::join_ordered;
use crate::version::process_version;
use crate::BuildContext;

/// Resolve and mirror every matching version of one package.
///
/// Version units run concurrently; their events are forwarded to `tx` one
/// unit at a time in resolved-version order. The first fatal event stops
/// forwarding and aborts the remaining version units.
pub(crate) async fn build_package(
    ctx: BuildContext,
    request: Arc<BuildRequest>,
    spec: PackageSpec,
    semaphore: Arc<Semaphore>,
    tx: EventSender,
) -> Result<PackageReport, Error> {
    let _permit = acquire_semaphore_permit(semaphore, &spec.name).await?;
    let name = spec.name.clone();

    tx.emit_package(PackageEvent::Started { name: name.clone() });

    let packument = match ctx.registry.fetch(&name).await {
        Ok(packument) => packument,
        Err(e) => {
            tx.emit_package(PackageEvent::MetadataFailed {
                name: name.clone(),
                failure: FailureContext::from_error(&e),
            });
            tx.emit_package(PackageEvent::NotFound { name });
            return Err(e);
        }
    };

    let resolved = match resolve_versions(&spec, &packument) {
        Ok(resolved) => resolved,
        Err(e) => {
            let event = match &e {
                ResolutionError::NoMatchingVersions { .. } => {
                    PackageEvent::NoMatchingVersions { name }
                }
                _ => PackageEvent::Failed {
                    name,
                    failure: FailureContext::from_error(&e),
                },
            };
            tx.emit_package(event);
            return Err(e.into());
        }
    };

    tx.emit_package(PackageEvent::VersionsMatched {
        name: name.clone(),
        versions: resolved.iter().map(|r| r.version.clone()).collect(),
    });

    let count = resolved.len();
    let mut units = JoinSet::new();
    let mut receivers = Vec::with_capacity(count);
    for (index, version) in resolved.into_iter().enumerate() {
        let (unit_tx, unit_rx) = channel();
        receivers.push(unit_rx);
        let unit = process_version(ctx.clone(), Arc::clone(&request), name.clone(), version, unit_tx);
        units.spawn(async move { (index, unit.await) });
    }

    for mut rx in receivers {
        while let Some(message) = rx.recv().await {
            let fatal = message.meta.level == Severity::Fatal;
            let line = message.event.message();
            let _ = tx.send(message);
            if fatal {
                return Err(Error::fatal(line));
            }
        }
    }

    let versions = join_ordered(units, count, &name).await?;
    Ok(PackageReport { name, versions })
}
