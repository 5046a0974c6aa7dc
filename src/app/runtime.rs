//! Wires the feed client and the worker pool together for one run.

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{ConfigError, RunConfig};
use crate::download::{HttpClient, PoolError, PoolReport, WorkerPool};
use crate::feed::{FeedClient, FeedError};

/// Errors that abort a whole run. Per-artifact failures are never one of these.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The feed could not be fetched or decoded.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The worker pool rejected its parameters.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Builds the shared HTTP client from the configured timeouts.
pub(crate) fn build_client(config: &RunConfig) -> Result<HttpClient, RunError> {
    HttpClient::with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)
        .map_err(RunError::Client)
}

/// Fetches the feed once and downloads every entry with the configured pool.
///
/// The feed is fetched before any worker starts, so a feed failure means no
/// artifact was requested and nothing was written. Once the pool runs, the
/// call returns only after every worker has drained the queue; individual
/// download failures are logged by their worker and counted in the report.
///
/// # Errors
///
/// Returns [`RunError`] for invalid configuration or a failed feed fetch.
#[instrument(skip(config), fields(feed = %config.feed_url, destination = %config.destination.display()))]
pub async fn run(config: &RunConfig) -> Result<PoolReport, RunError> {
    config.validate()?;

    let client = build_client(config)?;
    let pool = WorkerPool::new(client.clone(), config.concurrency, config.verbose)?;

    let entries = FeedClient::new(client).fetch(&config.feed_url).await?;
    info!(entries = entries.len(), workers = config.concurrency, "starting downloads");

    Ok(pool.run(entries, &config.destination).await)
}
