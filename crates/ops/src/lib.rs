#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build orchestration for shdeps
//!
//! This crate wires the specialised crates into the mirror build: request
//! validation, per-package metadata and version matching, per-version skip
//! probing and filtered extraction, ordered log rendering and the optional
//! deployment file.

mod build;
mod context;
mod deployment;
mod package;
mod units;
mod version;

pub use build::{build, run_build};
pub use context::{net_config, BuildContext, BuildContextBuilder};
pub use deployment::render_dockerfile;
