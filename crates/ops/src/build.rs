//! The build pipeline

use serde_json::Value;
use shdeps_config::create_semaphore;
use shdeps_errors::Error;
use shdeps_events::{channel, AppEvent, BuildEvent, EventMessage, LogAggregator};
use shdeps_store::{ensure_dir, remove_dir_all};
use shdeps_types::{BuildReport, BuildRequest};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use crate::deployment::write_dockerfile;
use crate::package::build_package;
use crate::units::join_ordered;
use crate::BuildContext;

/// Validate a raw build request document and run it.
///
/// Nothing touches the network or the filesystem when validation fails.
///
/// # Errors
///
/// Returns the first validation error, or the error that ended the run.
pub async fn build(ctx: &BuildContext, document: &Value) -> Result<BuildReport, Error> {
    let request = shdeps_config::validate(document)?;
    run_build(ctx, request).await
}

/// Run a validated build request.
///
/// Every package unit starts immediately, bounded by
/// `network.max_concurrent_packages`. Their events are rendered one package
/// at a time in request order. A fatal event ends the run and aborts all
/// units that are still working.
///
/// # Errors
///
/// Returns `Error::Fatal` for a fatal log event, or a filesystem error from
/// cleaning the output directory or writing the deployment file.
pub async fn run_build(ctx: &BuildContext, request: BuildRequest) -> Result<BuildReport, Error> {
    let start = Instant::now();
    let request = Arc::new(request);
    let mut aggregator = LogAggregator::new(request.log_level, Arc::clone(&ctx.sink));

    if request.clean {
        tracing::debug!(dir = %request.output_dir.display(), "cleaning output directory");
        remove_dir_all(&request.output_dir).await?;
    }

    let count = request.packages.len();
    dispatch(
        &mut aggregator,
        BuildEvent::Started {
            package_count: count,
        },
    )?;

    let semaphore = create_semaphore(ctx.network.max_concurrent_packages);
    let mut units = JoinSet::new();
    let mut receivers = Vec::with_capacity(count);
    for (index, spec) in request.packages.iter().cloned().enumerate() {
        let (tx, rx) = channel();
        receivers.push(rx);
        let unit = build_package(
            ctx.clone(),
            Arc::clone(&request),
            spec,
            Arc::clone(&semaphore),
            tx,
        );
        units.spawn(async move { (index, unit.await) });
    }

    for mut rx in receivers {
        aggregator.drain(&mut rx).await?;
    }
    let packages = join_ordered(units, count, "package").await?;

    ensure_dir(&request.output_dir).await?;

    let deployment_file = if request.generate_deployment_file {
        dispatch(
            &mut aggregator,
            BuildEvent::DeploymentFileCreated {
                output_dir: request.output_dir.display().to_string(),
            },
        )?;
        Some(write_dockerfile(&request.output_dir).await?)
    } else {
        None
    };

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    dispatch(&mut aggregator, BuildEvent::Finished { duration_ms })?;

    Ok(BuildReport {
        output_dir: request.output_dir.clone(),
        packages,
        deployment_file,
        duration_ms,
    })
}

fn dispatch(aggregator: &mut LogAggregator, event: BuildEvent) -> Result<(), Error> {
    aggregator.dispatch(&EventMessage::from_event(AppEvent::Build(event)))
}
