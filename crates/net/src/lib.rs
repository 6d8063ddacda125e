#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for shdeps
//!
//! This crate handles all HTTP operations: registry metadata fetches, the
//! mirror existence probe and streamed archive downloads.

mod client;

pub use client::{Auth, Credentials, NetClient, NetConfig};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use shdeps_errors::{Error, NetworkError};
use std::io;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Response body as a stream of byte chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Fetch a JSON document
///
/// # Errors
///
/// Returns an error if the request fails, the server answers with a non-2xx
/// status, or the body does not decode into `T`.
pub async fn fetch_json<T: DeserializeOwned>(client: &NetClient, url: &str) -> Result<T, Error> {
    tracing::debug!(%url, "fetching JSON");

    let response = client.get(url).await?;
    ensure_success(&response)?;

    let body = response
        .bytes()
        .await
        .map_err(|e| client::map_reqwest_error(&e))?;

    serde_json::from_slice(&body).map_err(|e| {
        NetworkError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Check whether a resource exists with a HEAD request
///
/// A 2xx answer means it exists; any other status means it does not.
///
/// # Errors
///
/// Transport failures (DNS, connection, timeout) are returned as errors
/// rather than treated as absence.
pub async fn probe_exists(client: &NetClient, url: &str) -> Result<bool, Error> {
    let response = client.head(url).await?;
    let exists = response.status().is_success();
    tracing::debug!(%url, status = response.status().as_u16(), exists, "probed mirror");
    Ok(exists)
}

/// Open a streamed download
///
/// `label` names the download in timeout errors, e.g. `react@17.0.1`.
/// Each body chunk must arrive within the configured read timeout.
///
/// # Errors
///
/// Returns `DownloadTimeout` if the request times out before the response
/// head arrives, or an HTTP error for non-2xx answers.
pub async fn open_stream(client: &NetClient, url: &str, label: &str) -> Result<ByteStream, Error> {
    let response = client.get(url).await.map_err(|e| match e {
        Error::Network(NetworkError::Timeout { .. }) => NetworkError::DownloadTimeout {
            package: label.to_string(),
        }
        .into(),
        other => other,
    })?;
    ensure_success(&response)?;

    let read_timeout = client.config().read_timeout;
    let body = response.bytes_stream().boxed();
    Ok(Box::pin(futures::stream::unfold(
        Some(body),
        move |state| async move {
            let mut body = state?;
            match tokio::time::timeout(read_timeout, body.next()).await {
                Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
                Ok(Some(Err(e))) => Some((Err(body_error(&e)), None)),
                Ok(None) => None,
                Err(_) => Some((Err(stalled(read_timeout)), None)),
            }
        },
    )))
}

fn body_error(e: &reqwest::Error) -> io::Error {
    let kind = if e.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, e.to_string())
}

fn stalled(after: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("no data received for {} seconds", after.as_secs()),
    )
}

fn ensure_success(response: &reqwest::Response) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(NetworkError::HttpError {
        status: status.as_u16(),
        message: format!("{status} for {}", response.url()),
    }
    .into())
}

/// Join a base URL and a relative path with exactly one slash
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
