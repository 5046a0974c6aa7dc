//! Error types for feed retrieval.

use thiserror::Error;

/// Fatal errors while retrieving the feed. Any of these aborts the run
/// before a single artifact is requested.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The configured feed URL is malformed.
    #[error("invalid feed URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The feed could not be fetched or its body could not be read.
    #[error("failed to fetch feed {url}: {source}")]
    Network {
        /// The feed URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The body is not a JSON array of feed entries. HTTP error pages end up
    /// here too; the status code is not inspected.
    #[error("failed to decode feed {url}: {source}")]
    Decode {
        /// The feed URL.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a decode error from a JSON error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}
