//! Build context for dependency injection

use shdeps_config::{Config, NetworkConfig};
use shdeps_errors::{Error, OpsError};
use shdeps_events::LogSink;
use shdeps_net::{Auth, Credentials, NetClient, NetConfig};
use shdeps_registry::RegistryClient;
use std::sync::Arc;
use std::time::Duration;

/// Everything a build needs besides the request itself
///
/// Cheap to clone; package and version units each hold a copy.
#[derive(Clone)]
pub struct BuildContext {
    /// Network client shared by metadata, probe and archive requests
    pub net: NetClient,
    /// Registry metadata client
    pub registry: RegistryClient,
    /// Concurrency and timeout settings
    pub network: NetworkConfig,
    /// Destination for rendered log lines
    pub sink: Arc<dyn LogSink>,
}

impl BuildContext {
    /// Build a context from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &Config, sink: Arc<dyn LogSink>) -> Result<Self, Error> {
        let net = NetClient::new(net_config(config)?)?;
        BuildContextBuilder::new()
            .with_registry(RegistryClient::new(net.clone(), config.registry.url.clone()))
            .with_net(net)
            .with_network(config.network.clone())
            .with_sink(sink)
            .build()
    }
}

/// Translate the `network` and `registry` sections into client settings
///
/// # Errors
///
/// Returns an error if credentials are configured for an unparsable
/// registry URL.
pub fn net_config(config: &Config) -> Result<NetConfig, Error> {
    let network = &config.network;
    let registry = &config.registry;

    let credentials = match (&registry.token, &registry.username, &registry.password) {
        (Some(token), _, _) => Some(Credentials::Bearer(token.clone())),
        (None, Some(username), password) => Some(Credentials::Basic {
            username: username.clone(),
            password: password.clone().unwrap_or_default(),
        }),
        _ => None,
    };
    let auth = credentials
        .map(|creds| Auth::new(&registry.url, creds))
        .transpose()?;

    Ok(NetConfig {
        timeout: Duration::from_secs(network.timeout_secs),
        connect_timeout: Duration::from_secs(network.connect_timeout_secs),
        read_timeout: Duration::from_secs(network.read_timeout_secs),
        retry_count: network.retries,
        retry_delay: Duration::from_secs(network.retry_delay_secs),
        auth,
        ..NetConfig::default()
    })
}

/// Builder for [`BuildContext`]
#[derive(Default)]
pub struct BuildContextBuilder {
    net: Option<NetClient>,
    registry: Option<RegistryClient>,
    network: Option<NetworkConfig>,
    sink: Option<Arc<dyn LogSink>>,
}

impl BuildContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set registry client
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryClient) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set network settings; defaults apply when unset
    #[must_use]
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    /// Set log sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<BuildContext, Error> {
        let net = self.net.ok_or_else(|| missing("net"))?;
        let registry = self.registry.ok_or_else(|| missing("registry"))?;
        let sink = self.sink.ok_or_else(|| missing("sink"))?;

        Ok(BuildContext {
            net,
            registry,
            network: self.network.unwrap_or_default(),
            sink,
        })
    }
}

fn missing(component: &str) -> OpsError {
    OpsError::MissingComponent {
        component: component.to_string(),
    }
}
