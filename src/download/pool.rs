//! Bounded worker pool that drains feed entries to disk.
//!
//! # Concurrency Model
//!
//! - One producer task publishes every entry, in feed order, onto a bounded
//!   channel and then drops its sender, closing the channel exactly once
//! - `concurrency` worker tasks share the receiver; each takes one entry at a
//!   time and exits when the channel is empty and closed
//! - [`WorkerPool::run`] joins every worker and the producer before returning
//! - Workers keep their own reports; nothing mutable is shared between them
//!   apart from the receiver itself
//!
//! A hanging request holds its worker until the HTTP client's read timeout
//! fires. There is no work-stealing and no retry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::outcome::{RunOutcome, TaskReport};
use super::writer::write_exclusive;
use crate::feed::FeedEntry;

/// Capacity of the task channel. One slot keeps the producer at most one
/// entry ahead of the workers.
const TASK_CHANNEL_CAPACITY: usize = 1;

/// Error type for worker pool construction.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Reports gathered by one worker over its lifetime.
#[derive(Debug)]
pub struct WorkerReport {
    /// Zero-based worker index.
    pub worker_id: usize,
    /// Every task this worker handled, in the order it handled them.
    pub reports: Vec<TaskReport>,
}

/// Result of a full pool run, available once every worker has exited.
#[derive(Debug)]
pub struct PoolReport {
    workers_started: usize,
    workers: Vec<WorkerReport>,
}

impl PoolReport {
    /// Number of worker tasks spawned for the run.
    #[must_use]
    pub fn workers_started(&self) -> usize {
        self.workers_started
    }

    /// Per-worker reports for every worker that exited normally.
    #[must_use]
    pub fn workers(&self) -> &[WorkerReport] {
        &self.workers
    }

    /// All task reports across workers. Order is unspecified.
    pub fn reports(&self) -> impl Iterator<Item = &TaskReport> {
        self.workers.iter().flat_map(|w| w.reports.iter())
    }

    /// Total tasks that reached a terminal outcome.
    #[must_use]
    pub fn tasks_observed(&self) -> usize {
        self.workers.iter().map(|w| w.reports.len()).sum()
    }

    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.count(RunOutcome::is_downloaded)
    }

    #[must_use]
    pub fn already_existing(&self) -> usize {
        self.count(RunOutcome::is_already_exists)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(RunOutcome::is_failed)
    }

    fn count(&self, predicate: impl Fn(&RunOutcome) -> bool) -> usize {
        self.reports().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Fixed-size pool of download workers.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    client: HttpClient,
    concurrency: usize,
    verbose: bool,
}

impl WorkerPool {
    /// Creates a pool that runs `concurrency` workers sharing `client`.
    ///
    /// When `verbose` is false, successful and already-present artifacts are
    /// not logged; failures always are.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug", skip(client))]
    pub fn new(client: HttpClient, concurrency: usize, verbose: bool) -> Result<Self, PoolError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(PoolError::InvalidConcurrency { value: concurrency });
        }

        Ok(Self {
            client,
            concurrency,
            verbose,
        })
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every entry into `destination_dir` and waits for all workers.
    ///
    /// Per-task failures are reported and never abort the run. The directory
    /// must already exist; it is not created here.
    #[instrument(skip(self, entries), fields(entries = entries.len(), destination = %destination_dir.display()))]
    pub async fn run(&self, entries: Vec<FeedEntry>, destination_dir: &Path) -> PoolReport {
        let (tx, rx) = mpsc::channel::<FeedEntry>(TASK_CHANNEL_CAPACITY);
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            handles.push(tokio::spawn(run_worker(
                worker_id,
                Arc::clone(&rx),
                self.client.clone(),
                destination_dir.to_path_buf(),
                self.verbose,
            )));
        }
        // Workers hold the only receivers now; if they all die the producer's
        // send fails instead of blocking forever.
        drop(rx);

        info!(workers = self.concurrency, "download workers started");

        let producer = tokio::spawn(async move {
            for entry in entries {
                if tx.send(entry).await.is_err() {
                    warn!("task channel closed before all entries were published");
                    break;
                }
            }
            debug!("all entries published");
        });

        let mut workers = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(e) => warn!(error = %e, "download worker panicked"),
            }
        }

        if let Err(e) = producer.await {
            warn!(error = %e, "entry producer panicked");
        }

        let report = PoolReport {
            workers_started: self.concurrency,
            workers,
        };
        debug!(
            downloaded = report.downloaded(),
            already_existing = report.already_existing(),
            failed = report.failed(),
            total = report.tasks_observed(),
            "all workers finished"
        );
        report
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<FeedEntry>>>,
    client: HttpClient,
    destination_dir: PathBuf,
    verbose: bool,
) -> WorkerReport {
    let mut reports = Vec::new();

    loop {
        // The guard is released at the end of this statement, before the download.
        let next = rx.lock().await.recv().await;
        let Some(entry) = next else {
            break;
        };

        let path = entry.destination_path(&destination_dir);
        debug!(worker_id, url = %entry.binary_url, path = %path.display(), "task received");

        let result = write_exclusive(&client, &path, &entry.binary_url).await;
        let report = TaskReport {
            worker_id,
            url: entry.binary_url,
            path,
            outcome: RunOutcome::from_result(result),
        };
        report.log(verbose);
        reports.push(report);
    }

    debug!(worker_id, tasks = reports.len(), "worker drained");
    WorkerReport { worker_id, reports }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_new_valid_concurrency() {
        let pool = WorkerPool::new(HttpClient::new(), 1, true).unwrap();
        assert_eq!(pool.concurrency(), 1);

        let pool = WorkerPool::new(HttpClient::new(), 100, false).unwrap();
        assert_eq!(pool.concurrency(), 100);
    }

    #[test]
    fn test_pool_new_rejects_zero() {
        let result = WorkerPool::new(HttpClient::new(), 0, true);
        assert!(matches!(
            result,
            Err(PoolError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_pool_new_rejects_too_many() {
        let result = WorkerPool::new(HttpClient::new(), 101, true);
        assert!(matches!(
            result,
            Err(PoolError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_pool_error_display() {
        let msg = PoolError::InvalidConcurrency { value: 0 }.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains("100"));
    }

    #[tokio::test]
    async fn test_run_with_no_entries_still_joins_every_worker() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = WorkerPool::new(HttpClient::new(), 3, true).unwrap();

        let report = pool.run(Vec::new(), dir.path()).await;

        assert_eq!(report.workers_started(), 3);
        assert_eq!(report.workers().len(), 3);
        assert_eq!(report.tasks_observed(), 0);
    }

    #[tokio::test]
    async fn test_run_reports_invalid_url_as_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = WorkerPool::new(HttpClient::new(), 2, true).unwrap();

        let report = pool
            .run(vec![FeedEntry::new("not a url/image.ota")], dir.path())
            .await;

        assert_eq!(report.tasks_observed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!dir.path().join("image.ota").exists());
    }
}
