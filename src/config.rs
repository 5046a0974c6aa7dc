//! Run configuration.
//!
//! A [`RunConfig`] is built once at startup and passed by reference into the
//! run; nothing is read from process-wide state afterwards.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::download::{CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};

/// Production firmware feed.
pub const FEED_STABLE_URL: &str = "http://fw.ota.homesmart.ikea.net/feed/version_info.json";

/// Pre-release firmware feed.
pub const FEED_TEST_URL: &str = "http://fw.test.ota.homesmart.ikea.net/feed/version_info.json";

/// Upper bound for either HTTP timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Known feed channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FeedChannel {
    /// Released firmware.
    #[default]
    Stable,
    /// Firmware under test.
    Test,
}

impl FeedChannel {
    /// Returns the feed URL for this channel.
    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            Self::Stable => FEED_STABLE_URL,
            Self::Test => FEED_TEST_URL,
        }
    }
}

impl fmt::Display for FeedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("stable"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "invalid worker count {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency { value: usize },

    #[error("invalid {field} {value}: must be between 1 and {MAX_TIMEOUT_SECS} seconds")]
    InvalidTimeout { field: &'static str, value: u64 },

    #[error("destination directory {path} does not exist")]
    DestinationMissing { path: PathBuf },

    #[error("destination {path} is not a directory")]
    DestinationNotDirectory { path: PathBuf },
}

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Feed to read entries from.
    pub feed_url: String,
    /// Existing directory artifacts are written into.
    pub destination: PathBuf,
    /// Number of download workers.
    pub concurrency: usize,
    /// Log successful and already-present artifacts.
    pub verbose: bool,
    /// List what would be downloaded without touching the filesystem.
    pub dry_run: bool,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Longest silence tolerated between two reads of a response, in seconds.
    /// `None` never gives up on a stalled transfer.
    pub read_timeout_secs: Option<u64>,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the destination.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            feed_url: FeedChannel::default().url().to_string(),
            destination: destination.into(),
            concurrency: DEFAULT_CONCURRENCY,
            verbose: true,
            dry_run: false,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: None,
        }
    }

    /// Checks value ranges and that the destination is an existing directory.
    ///
    /// The destination is not checked for dry runs, which never write.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        validate_timeout("connect timeout", self.connect_timeout_secs)?;
        if let Some(secs) = self.read_timeout_secs {
            validate_timeout("read timeout", secs)?;
        }

        if self.dry_run {
            return Ok(());
        }

        match std::fs::metadata(&self.destination) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ConfigError::DestinationNotDirectory {
                path: self.destination.clone(),
            }),
            Err(_) => Err(ConfigError::DestinationMissing {
                path: self.destination.clone(),
            }),
        }
    }
}

fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=MAX_TIMEOUT_SECS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { field, value })
    }
}
