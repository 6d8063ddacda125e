//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use shdeps_types::Severity;
use std::path::PathBuf;

/// shdeps - self-hosted mirror builder for shared npm dependencies
#[derive(Parser)]
#[command(name = "shdeps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Self-hosted mirror builder for shared npm dependencies")]
#[command(long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub build: BuildArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

impl Cli {
    /// Build arguments, whether or not `build` was spelled out
    pub fn into_build_args(self) -> (BuildArgs, GlobalArgs) {
        match self.command {
            Some(Commands::Build(args)) => (args, self.global),
            None => (self.build, self.global),
        }
    }
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Write a JSON debug log to the system temp directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print the build report as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download and extract the configured packages (default)
    Build(BuildArgs),
}

/// Options for a build; each flag overrides the matching config key
#[derive(Args, Clone, Default)]
pub struct BuildArgs {
    /// Configuration file (JSON or TOML)
    #[arg(value_name = "CONFIG", env = "SHARED_DEPENDENCIES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the packages are extracted into
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Allow --clean on an absolute output directory
    #[arg(long)]
    pub absolute_dir: bool,

    /// Minimum severity that is printed
    #[arg(long, value_enum)]
    pub log_level: Option<Severity>,

    /// Skip versions already served at this base URL
    #[arg(long, value_name = "URL")]
    pub skip_mirror_url: Option<String>,

    /// Write a Dockerfile for serving the output directory
    #[arg(long)]
    pub generate_dockerfile: bool,

    /// Registry to fetch package metadata from
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Take the package list from a package.json's dependencies
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "package.json"
    )]
    pub from_package_json: Option<PathBuf>,
}
