//! Dry-run flow: list what a run would fetch without writing anything.

use std::path::PathBuf;

use tracing::instrument;

use super::runtime::{RunError, build_client};
use crate::config::RunConfig;
use crate::feed::FeedClient;

/// One artifact a real run would attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDownload {
    pub url: String,
    pub path: PathBuf,
    pub filesize: Option<u64>,
    pub version: Option<String>,
}

/// Fetches the feed and resolves each entry's destination path.
///
/// # Errors
///
/// Returns [`RunError`] for invalid configuration or a failed feed fetch.
#[instrument(skip(config), fields(feed = %config.feed_url))]
pub async fn plan(config: &RunConfig) -> Result<Vec<PlannedDownload>, RunError> {
    config.validate()?;
    let entries = FeedClient::new(build_client(config)?)
        .fetch(&config.feed_url)
        .await?;

    Ok(entries
        .into_iter()
        .map(|entry| PlannedDownload {
            path: entry.destination_path(&config.destination),
            filesize: entry.filesize,
            version: entry.version(),
            url: entry.binary_url,
        })
        .collect())
}

/// Prints the plan to stdout, one artifact per line.
pub fn print_plan(plan: &[PlannedDownload]) {
    println!("Dry run - {} artifact(s), no files downloaded", plan.len());
    for item in plan {
        let size = item
            .filesize
            .map_or_else(|| "size unknown".to_string(), |bytes| format!("{bytes} bytes"));
        match &item.version {
            Some(version) => println!("- {} [{version}, {size}] <- {}", item.path.display(), item.url),
            None => println!("- {} [{size}] <- {}", item.path.display(), item.url),
        }
    }
}
