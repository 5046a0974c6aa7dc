//! Per-task outcomes and their log lines.

use std::path::PathBuf;

use tracing::{info, warn};

use super::error::DownloadError;

/// Terminal state of one download task.
#[derive(Debug)]
pub enum RunOutcome {
    /// The artifact was fetched and written to a new file.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The destination already existed; nothing was written.
    AlreadyExists,
    /// The task was abandoned.
    Failed(DownloadError),
}

impl RunOutcome {
    /// Converts a writer result into an outcome, folding
    /// [`DownloadError::AlreadyExists`] into [`RunOutcome::AlreadyExists`].
    #[must_use]
    pub fn from_result(result: Result<u64, DownloadError>) -> Self {
        match result {
            Ok(bytes) => Self::Downloaded { bytes },
            Err(DownloadError::AlreadyExists { .. }) => Self::AlreadyExists,
            Err(e) => Self::Failed(e),
        }
    }

    /// Short label used in log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Downloaded { .. } => "downloaded",
            Self::AlreadyExists => "already_exists",
            Self::Failed(e) if e.is_transport() => "transport_error",
            Self::Failed(_) => "io_error",
        }
    }

    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One task's outcome together with what it was about.
#[derive(Debug)]
pub struct TaskReport {
    /// Worker that handled the task.
    pub worker_id: usize,
    /// Source URL of the artifact.
    pub url: String,
    /// Destination the artifact was (or would have been) written to.
    pub path: PathBuf,
    /// What happened.
    pub outcome: RunOutcome,
}

impl TaskReport {
    /// Emits the single log line for this task.
    ///
    /// Successful and already-present artifacts are informational and only
    /// logged when `verbose` is set. Failures are always logged.
    pub fn log(&self, verbose: bool) {
        match &self.outcome {
            RunOutcome::Downloaded { bytes } if verbose => {
                info!(
                    worker = self.worker_id,
                    path = %self.path.display(),
                    bytes,
                    "{} downloaded",
                    self.path.display()
                );
            }
            RunOutcome::AlreadyExists if verbose => {
                info!(
                    worker = self.worker_id,
                    path = %self.path.display(),
                    "{} already exists",
                    self.path.display()
                );
            }
            RunOutcome::Failed(error) => {
                warn!(
                    worker = self.worker_id,
                    url = %self.url,
                    kind = self.outcome.label(),
                    "{error}"
                );
            }
            RunOutcome::Downloaded { .. } | RunOutcome::AlreadyExists => {}
        }
    }
}
