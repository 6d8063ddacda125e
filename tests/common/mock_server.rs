//! Mock registry and mirror servers for build tests
//!
//! The registry serves package metadata documents with versions in the order
//! they were published, plus their archives. A separate stalling server
//! simulates archive bodies that stop arriving.

use httpmock::prelude::*;
use httpmock::Method::HEAD;
use httpmock::Mock;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// An httpmock-backed npm registry
pub struct MockRegistry {
    server: MockServer,
}

#[allow(dead_code)] // Not every test binary uses every helper
impl MockRegistry {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// Base URL to configure as the registry
    pub fn url(&self) -> String {
        self.server.base_url()
    }

    /// Where the archive of `name@version` is served
    pub fn tarball_url(&self, name: &str, version: &str) -> String {
        self.server.url(tarball_path(name, version))
    }

    /// Serve a metadata document whose versions point at this server
    pub async fn publish_metadata(&self, name: &str, versions: &[&str]) -> Mock<'_> {
        let entries: Vec<(String, String)> = versions
            .iter()
            .map(|v| ((*v).to_string(), self.tarball_url(name, v)))
            .collect();
        self.publish_metadata_with_tarballs(name, &entries).await
    }

    /// Serve a metadata document with explicit archive URLs
    ///
    /// The body is written by hand so the version order survives.
    pub async fn publish_metadata_with_tarballs(
        &self,
        name: &str,
        versions: &[(String, String)],
    ) -> Mock<'_> {
        let body = metadata_document(name, versions);
        let path = format!("/{name}");
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(body);
            })
            .await
    }

    /// Serve the archive of `name@version`
    pub async fn serve_tarball(&self, name: &str, version: &str, body: Vec<u8>) -> Mock<'_> {
        self.serve_tarball_with(name, version, 200, body, None).await
    }

    /// Serve the archive of `name@version` with a status and optional delay
    pub async fn serve_tarball_with(
        &self,
        name: &str,
        version: &str,
        status: u16,
        body: Vec<u8>,
        delay: Option<Duration>,
    ) -> Mock<'_> {
        let path = tarball_path(name, version);
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                let then = then
                    .status(status)
                    .header("content-type", "application/octet-stream")
                    .body(body);
                if let Some(delay) = delay {
                    then.delay(delay);
                }
            })
            .await
    }

    /// Publish metadata and archives for a package in one go
    pub async fn publish(&self, name: &str, versions: &[(&str, Vec<u8>)]) {
        let keys: Vec<&str> = versions.iter().map(|(v, _)| *v).collect();
        self.publish_metadata(name, &keys).await;
        for (version, body) in versions {
            self.serve_tarball(name, version, body.clone()).await;
        }
    }

    /// Answer `GET /<name>` with 404
    pub async fn missing(&self, name: &str) -> Mock<'_> {
        let path = format!("/{name}");
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(404).body("Not Found");
            })
            .await
    }
}

/// An httpmock-backed static mirror answering existence probes
pub struct MockMirror {
    server: MockServer,
}

#[allow(dead_code)]
impl MockMirror {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// Base URL to configure as `skipMirrorUrl`, with a trailing slash
    pub fn url(&self) -> String {
        format!("{}/npm/", self.server.base_url())
    }

    /// Report `name@version` as already mirrored
    pub async fn has(&self, name: &str, version: &str) -> Mock<'_> {
        let path = format!("/npm/{name}@{version}/package.json");
        self.server
            .mock_async(|when, then| {
                when.method(HEAD).path(path);
                then.status(200);
            })
            .await
    }

    /// Report `name@version` as absent
    pub async fn lacks(&self, name: &str, version: &str) -> Mock<'_> {
        let path = format!("/npm/{name}@{version}/package.json");
        self.server
            .mock_async(|when, then| {
                when.method(HEAD).path(path);
                then.status(404);
            })
            .await
    }
}

/// A server that sends response headers and part of a body, then stalls
pub struct StallingServer {
    addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl StallingServer {
    /// Serve `content`, holding the connection open after `sent` bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to a port.
    pub async fn new(content: Vec<u8>, sent: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let content = Arc::new(content);

        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let content = Arc::clone(&content);
                tokio::spawn(async move {
                    let mut buffer = [0; 1024];
                    if stream.read(&mut buffer).await.is_err() {
                        return;
                    }

                    let headers = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\n\r\n",
                        content.len()
                    );
                    if stream.write_all(headers.as_bytes()).await.is_err() {
                        return;
                    }
                    let partial = &content[..sent.min(content.len())];
                    if stream.write_all(partial).await.is_err() {
                        return;
                    }
                    let _ = stream.flush().await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// URL of the stalled archive
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

fn tarball_path(name: &str, version: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    format!("/{name}/-/{base}-{version}.tgz")
}

fn metadata_document(name: &str, versions: &[(String, String)]) -> String {
    let entries = versions
        .iter()
        .map(|(version, tarball)| {
            format!(
                r#""{version}": {{ "name": "{name}", "version": "{version}", "dist": {{ "tarball": "{tarball}" }} }}"#
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(r#"{{ "name": "{name}", "versions": {{ {entries} }} }}"#)
}
