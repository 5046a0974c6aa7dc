//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use firmware_fetch::download::{CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY};
use firmware_fetch::{FeedChannel, RunConfig};

/// Mirror firmware binaries listed in an OTA update feed.
///
/// Every binary is written to DESTINATION under the last segment of its URL.
/// Existing files are never overwritten, so repeated runs only fetch what is new.
#[derive(Parser, Debug)]
#[command(name = "firmware-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Existing directory to write firmware binaries into
    pub destination: PathBuf,

    /// Firmware feed channel to read
    #[arg(long, value_enum, default_value_t = FeedChannel::Stable)]
    pub feed: FeedChannel,

    /// Read this feed URL instead of a named channel
    #[arg(long, value_name = "URL", conflicts_with = "feed")]
    pub feed_url: Option<String>,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'w', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub workers: u8,

    /// Log downloaded and already-present files (use -v=false to silence)
    #[arg(
        short,
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub verbose: bool,

    /// List what would be downloaded without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Give up on a transfer after this many seconds without data (1-3600, default: never)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,
}

impl Args {
    /// Resolves the arguments into a run configuration.
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            feed_url: self
                .feed_url
                .unwrap_or_else(|| self.feed.url().to_string()),
            destination: self.destination,
            concurrency: usize::from(self.workers),
            verbose: self.verbose,
            dry_run: self.dry_run,
            connect_timeout_secs: self.connect_timeout,
            read_timeout_secs: self.read_timeout,
        }
    }
}
