#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for shdeps
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`shared-deps.json` or `shared-deps.toml`)
//! - Environment variables
//! - CLI flags (applied by the binary on top of the loaded document)
//!
//! The build request keys live at the top level of the file and stay a raw
//! JSON document until [`Config::build_request`] validates them.

pub mod resources_semaphore;
pub mod validate;

pub use resources_semaphore::{acquire_semaphore_permit, create_semaphore};
pub use validate::validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shdeps_errors::{ConfigError, Error};
use shdeps_types::BuildRequest;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Config file names looked up in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["shared-deps.json", "shared-deps.toml"];

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SHARED_DEPENDENCIES_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw build request document, validated on demand
    pub request: Map<String, Value>,
    pub registry: RegistryConfig,
    pub network: NetworkConfig,
}

/// Registry endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url", alias = "registry")]
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Longest gap allowed between two chunks of an archive body
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_max_concurrent_packages")]
    pub max_concurrent_packages: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            token: None,
            username: None,
            password: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300, // 5 minutes
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            retries: 0,
            retry_delay_secs: 1,
            max_concurrent_packages: 4,
        }
    }
}

// Default value functions for serde
fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

fn default_retry_delay() -> u64 {
    1
}

fn default_max_concurrent_packages() -> usize {
    4
}

impl Config {
    /// Build a config from a parsed document.
    ///
    /// `registry` (or the older `registryFetchOptions`) and `network` are
    /// lifted out; every other key belongs to the build request.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object or if the
    /// `registry`/`network` sections have the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let Value::Object(mut request) = value else {
            return Err(ConfigError::ParseError {
                message: "configuration must be an object".to_string(),
            }
            .into());
        };

        let registry: RegistryConfig = request
            .remove("registry")
            .or_else(|| request.remove("registryFetchOptions"))
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ConfigError::ParseError {
                message: format!("registry: {e}"),
            })?
            .unwrap_or_default();

        let network: NetworkConfig = request
            .remove("network")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ConfigError::ParseError {
                message: format!("network: {e}"),
            })?
            .unwrap_or_default();

        Ok(Self {
            request,
            registry,
            network,
        })
    }

    /// Load configuration from file, JSON or TOML by extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if its contents cannot
    /// be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let value: Value = if is_toml {
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?
        };

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_value(value)
    }

    /// Locate the default config file in `dir`, if any
    #[must_use]
    pub fn default_path(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file. Otherwise the first
    /// default config file in the working directory is used, falling back
    /// to an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path).await;
        }

        let cwd = std::env::current_dir()?;
        match Self::default_path(&cwd) {
            Some(found) => Self::load_from_file(&found).await,
            None => Ok(Self::default()),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // SHDEPS_REGISTRY
        if let Ok(url) = std::env::var("SHDEPS_REGISTRY") {
            self.registry.url = url;
        }

        // SHDEPS_REGISTRY_TOKEN
        if let Ok(token) = std::env::var("SHDEPS_REGISTRY_TOKEN") {
            self.registry.token = Some(token);
        }

        // SHDEPS_TIMEOUT
        if let Ok(timeout) = std::env::var("SHDEPS_TIMEOUT") {
            self.network.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SHDEPS_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        // SHDEPS_LOG_LEVEL
        if let Ok(level) = std::env::var("SHDEPS_LOG_LEVEL") {
            self.set("logLevel", Value::String(level));
        }

        Ok(())
    }

    /// Override a top-level build request key
    pub fn set(&mut self, key: &str, value: Value) {
        self.request.insert(key.to_string(), value);
    }

    /// Validate the build request document
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn build_request(&self) -> Result<BuildRequest, Error> {
        validate(&Value::Object(self.request.clone())).map_err(Into::into)
    }
}
