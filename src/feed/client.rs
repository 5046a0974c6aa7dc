//! Feed retrieval: one GET, one JSON decode.

use tracing::{debug, info, instrument};
use url::Url;

use super::entry::FeedEntry;
use super::error::FeedError;
use crate::download::HttpClient;

/// Fetches and decodes firmware feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: HttpClient,
}

impl FeedClient {
    /// Creates a feed client that reuses `client`'s connection pool.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Fetches `url` and decodes its body as a JSON array of entries.
    ///
    /// Array order is preserved. There is no retry; the response body is
    /// read completely before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] for a malformed URL,
    /// [`FeedError::Network`] when the request or body read fails, and
    /// [`FeedError::Decode`] when the body is not a feed. A non-2xx status is
    /// not an error by itself: its body is decoded like any other.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        Url::parse(url).map_err(|_| FeedError::invalid_url(url))?;

        let response = self
            .client
            .inner()
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::network(url, e))?;
        debug!(status = response.status().as_u16(), "feed response received");

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::network(url, e))?;

        let entries: Vec<FeedEntry> =
            serde_json::from_slice(&body).map_err(|e| FeedError::decode(url, e))?;

        info!(entries = entries.len(), "feed parsed");
        Ok(entries)
    }
}
