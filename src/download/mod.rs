//! Concurrent artifact download engine.
//!
//! This module fetches firmware binaries named by feed entries and writes
//! each one to its own file, never overwriting an existing file.
//!
//! # Features
//!
//! - Fixed-size worker pool fed by a single bounded channel
//! - Streaming writes (memory-efficient for large images)
//! - Exclusive-create destination files, so repeated runs are idempotent
//! - Per-task outcomes that never abort sibling tasks
//!
//! # Example
//!
//! ```no_run
//! use firmware_fetch::download::{HttpClient, WorkerPool};
//! use firmware_fetch::feed::FeedEntry;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = WorkerPool::new(HttpClient::new(), 4, true)?;
//! let entries = vec![FeedEntry::new("https://example.com/bin/image.ota")];
//! let report = pool.run(entries, Path::new("./firmware")).await;
//! println!("downloaded {}", report.downloaded());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod outcome;
mod pool;
mod writer;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use error::DownloadError;
pub use outcome::{RunOutcome, TaskReport};
pub use pool::{PoolError, PoolReport, WorkerPool, WorkerReport};
pub use writer::write_exclusive;
