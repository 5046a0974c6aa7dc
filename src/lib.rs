//! Firmware Feed Mirror Library
//!
//! Reads a firmware update feed and mirrors every binary it lists into a
//! local directory, downloading with a bounded pool of concurrent workers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`feed`] - Feed entry model, filename derivation and feed retrieval
//! - [`download`] - HTTP client, exclusive-create writer and worker pool
//! - [`config`] - Run configuration and feed channels
//! - [`app`] - Run coordination and dry-run planning

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod download;
pub mod feed;
mod user_agent;

// Re-export commonly used types
pub use config::{FeedChannel, RunConfig};
pub use download::{
    DEFAULT_CONCURRENCY, DownloadError, HttpClient, PoolReport, RunOutcome, TaskReport, WorkerPool,
};
pub use feed::{FeedClient, FeedEntry, FeedError};
