//! Bounded, best-effort fan-out of independent single-row writes.
//!
//! Used where one logical operation touches many rows without a
//! transaction (focal-person rename, bulk log delete). Every write runs on
//! its own; a failure is logged and counted and never undoes the others.

use std::future::Future;

use futures::stream::{self, StreamExt};
use pmo_core::types::DbId;
use serde::Serialize;

/// Outcome of a fan-out over a set of row ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
    /// Rows selected for the operation.
    pub matched: usize,
    /// Writes that changed a row.
    pub applied: usize,
    /// Writes that succeeded but found nothing to change.
    pub unchanged: usize,
    /// Ids whose write failed.
    pub failed: Vec<DbId>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `op` once per id with at most `concurrency` writes in flight.
///
/// `op` returns the number of rows it affected.
pub async fn run<F, Fut>(label: &str, ids: Vec<DbId>, concurrency: usize, op: F) -> FanOutReport
where
    F: Fn(DbId) -> Fut,
    Fut: Future<Output = Result<u64, sqlx::Error>>,
{
    let mut report = FanOutReport {
        matched: ids.len(),
        ..Default::default()
    };

    let results: Vec<(DbId, Result<u64, sqlx::Error>)> = stream::iter(ids)
        .map(|id| {
            let write = op(id);
            async move { (id, write.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (id, result) in results {
        match result {
            Ok(0) => report.unchanged += 1,
            Ok(_) => report.applied += 1,
            Err(e) => {
                tracing::warn!(op = label, id, error = %e, "Fan-out write failed");
                report.failed.push(id);
            }
        }
    }

    report.failed.sort_unstable();
    tracing::info!(
        op = label,
        matched = report.matched,
        applied = report.applied,
        unchanged = report.unchanged,
        failed = report.failed.len(),
        "Fan-out finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_failed_write_does_not_stop_the_rest() {
        let ids: Vec<DbId> = (1..=5).collect();
        let report = run("test", ids, 2, |id| async move {
            if id == 3 {
                Err(sqlx::Error::RowNotFound)
            } else {
                Ok(1)
            }
        })
        .await;

        assert_eq!(report.matched, 5);
        assert_eq!(report.applied, 4);
        assert_eq!(report.unchanged, 0);
        assert_eq!(report.failed, vec![3]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn unchanged_rows_are_counted_separately() {
        let report = run("test", vec![10, 20, 30], 8, |id| async move {
            Ok(u64::from(id != 20))
        })
        .await;

        assert_eq!(report.applied, 2);
        assert_eq!(report.unchanged, 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn zero_concurrency_still_runs() {
        let report = run("test", vec![1, 2], 0, |_| async { Ok(1) }).await;
        assert_eq!(report.applied, 2);
    }
}
