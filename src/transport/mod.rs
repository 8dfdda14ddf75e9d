//! Appliance safelist API client.
//!
//! Each appliance exposes its safelist at two endpoints:
//!
//! - `GET  http://<host>/api/v0/empire/whitelist/export` → `200` + JSON array
//! - `POST http://<host>/api/v0/empire/whitelist/import` → `201` on success
//!
//! The sync driver talks to hosts through the [`Transport`] trait so that a
//! pass can be exercised without a network. [`HttpTransport`] is the real
//! implementation. Its trait methods never fail: every problem is
//! classified as a [`TransportError`], logged on the diagnostic channel
//! and reported as "no data" / "not accepted".

use std::future::Future;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use crate::model::Entry;

/// Export endpoint path.
pub const EXPORT_PATH: &str = "/api/v0/empire/whitelist/export";

/// Import endpoint path.
pub const IMPORT_PATH: &str = "/api/v0/empire/whitelist/import";

/// Upper bound on a single request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters that cannot appear in a `host:port` string.
const HOST_FORBIDDEN: &[char] = &['/', '?', '#', '@', '\\'];

/// Why a request to a host produced nothing usable.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid host {host:?}")]
    InvalidHost { host: String },

    #[error("timed out")]
    Timeout,

    /// Refused, unresolvable, or failed TLS handshake.
    #[error("connection error: {0}")]
    Connect(String),

    #[error("too many redirects")]
    Redirect,

    #[error("decoding error: {0}")]
    Decode(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            Self::Redirect
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Access to a host's safelist.
pub trait Transport: Send + Sync {
    /// Fetch the host's current list, or `None` when nothing usable came back.
    fn fetch(&self, host: &str) -> impl Future<Output = Option<Vec<Entry>>> + Send;

    /// Add entries to the host's list. Returns whether the host accepted them.
    fn push(&self, host: &str, entries: &[Entry]) -> impl Future<Output = bool> + Send;
}

/// HTTP implementation of [`Transport`].
pub struct HttpTransport {
    client: reqwest::Client,
    scheme: String,
}

impl HttpTransport {
    /// Create a transport speaking plain HTTP.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scheme("http")
    }

    /// Create a transport using a different URL scheme.
    #[must_use]
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: scheme.into(),
        }
    }

    /// Build the URL of an endpoint on `host`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidHost`] when `host` is not a bare
    /// `host[:port]` authority.
    pub fn endpoint(&self, host: &str, path: &str) -> Result<Url, TransportError> {
        let invalid = || TransportError::InvalidHost {
            host: host.to_string(),
        };

        if host.is_empty() || host.contains(HOST_FORBIDDEN) || host.contains(char::is_whitespace) {
            return Err(invalid());
        }

        Url::parse(&format!("{}://{host}{path}", self.scheme)).map_err(|_| invalid())
    }

    /// Fetch a host's list, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on transport failure, any status other
    /// than `200`, an empty body, or a body that is not a JSON array of objects.
    pub async fn try_fetch(&self, host: &str) -> Result<Vec<Entry>, TransportError> {
        let url = self.endpoint(host, EXPORT_PATH)?;
        debug!(%url, "API request: GET");

        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(TransportError::EmptyBody);
        }

        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Push entries to a host, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on transport failure or any status other
    /// than `201`.
    pub async fn try_push(&self, host: &str, entries: &[Entry]) -> Result<(), TransportError> {
        let url = self.endpoint(host, IMPORT_PATH)?;
        debug!(%url, count = entries.len(), "API request: POST");

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(entries)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(host, status = status.as_u16(), body = %body, "Import response");

        if status == StatusCode::CREATED {
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, host: &str) -> Option<Vec<Entry>> {
        match self.try_fetch(host).await {
            Ok(entries) => {
                debug!(host, count = entries.len(), "Fetched safelist");
                Some(entries)
            }
            Err(e) => {
                debug!(host, error = %e, "Fetch failed");
                None
            }
        }
    }

    async fn push(&self, host: &str, entries: &[Entry]) -> bool {
        match self.try_push(host, entries).await {
            Ok(()) => {
                debug!(host, count = entries.len(), "Import appeared successful");
                true
            }
            Err(e) => {
                debug!(host, error = %e, "Push failed");
                false
            }
        }
    }
}
