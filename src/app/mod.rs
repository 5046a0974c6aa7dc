//! Run coordination: feed retrieval followed by the download pool.

mod dry_run;
mod runtime;

pub use dry_run::{PlannedDownload, plan, print_plan};
pub use runtime::{RunError, run};
