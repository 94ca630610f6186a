//! Best-effort batch runner
//!
//! Multi-step collection operations (list-deletion moves, legacy
//! migration) tolerate partial failure: a per-item error is recorded
//! and the run continues. The result is an explicit summary, never an
//! exception, so partial completion is a visible outcome rather than
//! a failure mode requiring rollback.

use std::future::Future;

use serde::Serialize;

use crate::error::AppError;

/// Outcome of a single batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The operation changed something.
    Applied,
    /// The item was already in the desired state.
    Skipped,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Identifiers of the items whose operation errored.
    pub failed_ids: Vec<i64>,
}

/// Apply `op` to every item sequentially, collecting a summary.
///
/// `key` extracts the identifier reported for failed items.
/// Per-item errors are logged at warn level and never abort the run.
pub async fn run<T, K, F, Fut>(items: Vec<T>, key: K, mut op: F) -> BatchSummary
where
    K: Fn(&T) -> i64,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<ItemOutcome, AppError>>,
{
    let mut summary = BatchSummary::default();

    for item in items {
        let id = key(&item);
        match op(item).await {
            Ok(ItemOutcome::Applied) => summary.succeeded += 1,
            Ok(ItemOutcome::Skipped) => summary.skipped += 1,
            Err(error) => {
                tracing::warn!(item_id = id, %error, "Batch item failed");
                summary.failed += 1;
                summary.failed_ids.push(id);
            }
        }
    }

    summary
}
