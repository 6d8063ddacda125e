//! shdeps - self-hosted mirror builder for shared npm dependencies
//!
//! Loads the build configuration, applies environment and command line
//! overrides, and runs the build through the ops crate.

mod cli;
mod console;
mod display;
mod error;
mod logging;
mod manifest;

use crate::cli::{BuildArgs, Cli};
use crate::console::ConsoleSink;
use crate::display::OutputRenderer;
use crate::error::CliError;
use clap::Parser;
use serde_json::Value;
use shdeps_config::Config;
use shdeps_ops::BuildContext;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (args, global) = cli.into_build_args();

    if let Some(path) = logging::init_tracing(global.debug) {
        eprintln!("Debug log: {}", path.display());
    }

    if let Err(e) = run(args, global.json).await {
        error!("Application error: {}", e);
        if !e.already_reported() {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(args: BuildArgs, json: bool) -> Result<(), CliError> {
    info!("Starting shdeps v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults)
    let mut config = Config::load_or_default(args.config.as_deref()).await?;

    // 2. Environment variables
    config.merge_env()?;

    // 3. CLI flags (highest precedence)
    apply_cli_config(&mut config, &args).await?;

    let ctx = BuildContext::from_config(&config, Arc::new(ConsoleSink))?;
    let report = shdeps_ops::build(&ctx, &Value::Object(config.request.clone())).await?;

    OutputRenderer::new(json).render_report(&report)?;
    info!(duration_ms = report.duration_ms, "Build completed successfully");
    Ok(())
}

/// Overlay command line flags onto the loaded configuration
async fn apply_cli_config(config: &mut Config, args: &BuildArgs) -> Result<(), CliError> {
    if let Some(dir) = &args.output_dir {
        config.set("outputDir", Value::String(dir.clone()));
    }
    if args.clean {
        config.set("clean", Value::Bool(true));
    }
    if args.absolute_dir {
        config.set("absoluteDir", Value::Bool(true));
    }
    if let Some(level) = args.log_level {
        config.set("logLevel", Value::String(level.as_str().to_string()));
    }
    if let Some(url) = &args.skip_mirror_url {
        config.set("skipMirrorUrl", Value::String(url.clone()));
    }
    if args.generate_dockerfile {
        config.set("generateDeploymentFile", Value::Bool(true));
    }
    if let Some(registry) = &args.registry {
        config.registry.url.clone_from(registry);
    }
    if let Some(path) = &args.from_package_json {
        let packages = manifest::packages_from_file(path).await?;
        config.set("packages", packages);
    }
    Ok(())
}
