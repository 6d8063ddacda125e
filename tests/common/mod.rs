//! Common test utilities for end-to-end build tests
//!
//! This module provides:
//! - A mock npm registry and mirror
//! - npm-style archive generation
//! - Build context and request helpers

pub mod mock_server;
pub mod package_generator;

#[allow(unused_imports)]
pub use mock_server::{MockMirror, MockRegistry, StallingServer};
#[allow(unused_imports)]
pub use package_generator::{react_tarball, TarballBuilder, REACT_FILES};

use shdeps_events::MemorySink;
use shdeps_net::{NetClient, NetConfig};
use shdeps_ops::{BuildContext, BuildContextBuilder};
use shdeps_registry::RegistryClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A temporary working area plus an in-memory log sink
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub sink: MemorySink,
}

#[allow(dead_code)] // Not every test binary uses every helper
impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            sink: MemorySink::new(),
        }
    }

    /// Absolute output directory inside the temp area
    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("npm")
    }

    pub fn output_str(&self) -> String {
        self.output_dir().display().to_string()
    }

    /// Context with default network settings
    pub fn context(&self, registry_url: &str) -> BuildContext {
        self.context_with(registry_url, NetConfig::default())
    }

    /// Context with short timeouts for stalled-transfer tests
    pub fn context_with_timeouts(
        &self,
        registry_url: &str,
        timeout: Duration,
        read_timeout: Duration,
    ) -> BuildContext {
        self.context_with(
            registry_url,
            NetConfig {
                timeout,
                read_timeout,
                ..NetConfig::default()
            },
        )
    }

    fn context_with(&self, registry_url: &str, config: NetConfig) -> BuildContext {
        let net = NetClient::new(config).unwrap();
        BuildContextBuilder::new()
            .with_registry(RegistryClient::new(net.clone(), registry_url))
            .with_net(net)
            .with_sink(Arc::new(self.sink.clone()))
            .build()
            .unwrap()
    }

    /// Rendered lines without severities
    pub fn messages(&self) -> Vec<String> {
        self.sink.messages()
    }

    /// Relative paths of every file below `dir`, sorted
    pub fn files_under(dir: &Path) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(dir, dir, &mut files);
        files.sort();
        files
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(relative) = path.strip_prefix(root) {
            let parts: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }
}
