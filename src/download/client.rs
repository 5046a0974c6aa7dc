//! HTTP client wrapper shared by the feed client and download workers.
//!
//! This module provides the `HttpClient` struct which owns a pooled
//! `reqwest::Client` configured with a connect timeout, an optional idle read
//! timeout and the crate's User-Agent. There is no whole-request timeout: a
//! slow but progressing transfer is never cut off.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for feed and artifact requests.
///
/// Cloning is cheap; clones share one connection pool, so a single client is
/// created per run and handed to every worker.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Idle read timeout: none
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, None)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// `read_timeout_secs` bounds the gap between two reads of the same
    /// response, not the transfer as a whole. `None` leaves reads unbounded.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend or system configuration
    /// cannot be initialized.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: Option<u64>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent());
        if let Some(secs) = read_timeout_secs {
            builder = builder.read_timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issues a GET and requires a success status.
    ///
    /// A non-2xx answer is an error and its body is never read, so an error
    /// page is not saved under an artifact's name. Callers open the
    /// destination file only after this returns `Ok`, which means a 404 or 500
    /// leaves no file behind and the next run retries the artifact.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for an unparseable URL,
    /// [`DownloadError::Network`]/[`DownloadError::Timeout`] when no response
    /// arrives, and [`DownloadError::HttpStatus`] for a non-2xx answer.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "non-success response");
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }

    /// Returns a reference to the underlying reqwest client.
    ///
    /// The feed client uses this to read bodies without status checks.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_custom_timeouts() {
        assert!(HttpClient::with_timeouts(1, Some(1)).is_ok());
        assert!(HttpClient::with_timeouts(1, None).is_ok());
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_url_without_network() {
        let client = HttpClient::new();
        let result = client.get("not a url").await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_get_connection_refused_is_network_error() {
        let client = HttpClient::with_timeouts(2, None).unwrap();
        let result = client.get("http://127.0.0.1:1/image.ota").await;
        let err = result.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }
}
