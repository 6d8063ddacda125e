#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! npm registry access for shdeps
//!
//! Fetches package metadata documents and exposes the published versions in
//! the order the registry lists them.

mod models;

pub use models::{Dist, Packument, VersionMetadata, Versions};

use shdeps_errors::Error;
use shdeps_net::NetClient;

/// Default public registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Client for one registry endpoint
#[derive(Clone)]
pub struct RegistryClient {
    client: NetClient,
    base_url: String,
}

impl RegistryClient {
    #[must_use]
    pub fn new(client: NetClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Metadata URL for a package; scoped names keep the `@` and escape the
    /// slash
    #[must_use]
    pub fn package_url(&self, name: &str) -> String {
        shdeps_net::join_url(&self.base_url, &escape_name(name))
    }

    /// Fetch the metadata document for `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the registry answers with a
    /// non-2xx status, or the document is malformed.
    pub async fn fetch(&self, name: &str) -> Result<Packument, Error> {
        let url = self.package_url(name);
        let packument: Packument = shdeps_net::fetch_json(&self.client, &url).await?;
        tracing::debug!(
            package = name,
            versions = packument.versions.len(),
            "fetched package metadata"
        );
        Ok(packument)
    }
}

fn escape_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}
