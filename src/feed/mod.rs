//! Firmware feed model and retrieval.
//!
//! A feed is a JSON array of entries, each naming one firmware binary by URL
//! plus metadata that is carried through untouched.

mod client;
mod entry;
mod error;

pub use client::FeedClient;
pub use entry::{FALLBACK_FILENAME, FeedEntry};
pub use error::FeedError;
