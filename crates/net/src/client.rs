//! HTTP client with connection pooling and optional retries

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shdeps_errors::{Error, NetworkError};
use std::time::Duration;
use url::Url;

/// Registry credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Basic { username: String, password: String },
}

/// Credentials bound to the origin they may be sent to
#[derive(Debug, Clone)]
pub struct Auth {
    origin: url::Origin,
    credentials: Credentials,
}

impl Auth {
    /// Scope credentials to the origin of `registry_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL cannot be parsed.
    pub fn new(registry_url: &str, credentials: Credentials) -> Result<Self, Error> {
        let origin = crate::parse_url(registry_url)?.origin();
        Ok(Self {
            origin,
            credentials,
        })
    }

    fn applies_to(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|u| u.origin() == self.origin)
    }
}

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Deadline for a whole request, body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest allowed gap between two body chunks of a streamed download
    pub read_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
    pub auth: Option<Auth>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry_count: 0,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("shdeps/{}", env!("CARGO_PKG_VERSION")),
            auth: None,
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a GET request, with retries when configured
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all attempts, including
    /// timeouts, connection failures, or an invalid URL.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(|| self.authorize(self.client.get(url), url).send())
            .await
    }

    /// Execute a HEAD request, with retries when configured
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all attempts.
    pub async fn head(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(|| self.authorize(self.client.head(url), url).send())
            .await
    }

    fn authorize(&self, builder: RequestBuilder, url: &str) -> RequestBuilder {
        match &self.config.auth {
            Some(auth) if auth.applies_to(url) => match &auth.credentials {
                Credentials::Bearer(token) => builder.bearer_auth(token),
                Credentials::Basic { username, password } => {
                    builder.basic_auth(username, Some(password))
                }
            },
            _ => builder,
        }
    }

    /// Execute a request with retries
    async fn retry_request<F, Fut>(&self, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay * attempt).await;
                tracing::debug!(attempt, "retrying request");
            }

            match f().await {
                Ok(response) => {
                    if response.status().is_server_error() && attempt < self.config.retry_count {
                        continue;
                    }

                    // Check for rate limiting
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = Self::should_retry(&e);
                    last_error = Some(e);

                    // Don't retry on certain errors
                    if !retry {
                        break;
                    }
                }
            }
        }

        match last_error {
            Some(e) => Err(map_reqwest_error(&e).into()),
            None => Err(NetworkError::DownloadFailed("Unknown error".to_string()).into()),
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        // Retry on timeout, connection errors, and server errors
        error.is_timeout()
            || error.is_connect()
            || error.status().is_some_and(|s| s.is_server_error())
    }
}

/// Convert a transport error into the matching network error
pub(crate) fn map_reqwest_error(e: &reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: e.url().map(ToString::to_string).unwrap_or_default(),
        }
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(e.to_string())
    } else if e.is_builder() {
        NetworkError::InvalidUrl(e.to_string())
    } else {
        NetworkError::DownloadFailed(e.to_string())
    }
}
