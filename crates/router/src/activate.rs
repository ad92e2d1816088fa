//! Activate: retire every generation except the current one.

use std::sync::Arc;

use tokio::task::JoinSet;

use fetchwork_core::{CacheStore, Error};

/// Outcome of one activation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale generations that were deleted.
    pub removed: Vec<String>,
    /// Stale generations whose deletion failed; they stay listed and
    /// are retried on the next activation.
    pub retained: Vec<String>,
}

/// Delete every generation other than `current`, in parallel.
///
/// Activation returns only after every deletion has settled, so a host
/// switching generations knows old content is gone when this resolves.
pub(crate) async fn run<S>(store: &Arc<S>, current: &str) -> Result<ActivateReport, Error>
where
    S: CacheStore + Send + Sync + 'static,
{
    let names = store.names().await?;

    let mut join_set = JoinSet::new();
    for name in names.into_iter().filter(|name| name != current) {
        let store = Arc::clone(store);
        join_set.spawn(async move {
            tracing::info!(generation = %name, "activate: deleting stale generation");
            let outcome = store.delete(&name).await;
            (name, outcome)
        });
    }

    let mut report = ActivateReport::default();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((name, Ok(_existed))) => report.removed.push(name),
            Ok((name, Err(e))) => {
                tracing::warn!(generation = %name, error = %e, "failed to delete stale generation");
                report.retained.push(name);
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation delete task panicked");
            }
        }
    }

    report.removed.sort();
    report.retained.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FlakyStore;
    use fetchwork_core::MemoryStore;

    #[tokio::test]
    async fn test_activate_removes_exactly_stale_generations() {
        let store = Arc::new(MemoryStore::new());
        for name in ["wb-v1", "wb-v2", "wb-v3"] {
            store.open(name).await.unwrap();
        }

        let report = run(&store, "wb-v3").await.unwrap();
        assert_eq!(report.removed, vec!["wb-v1".to_string(), "wb-v2".to_string()]);
        assert!(report.retained.is_empty());
        assert_eq!(store.names().await.unwrap(), vec!["wb-v3".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_with_only_current_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        store.open("wb-v3").await.unwrap();

        let report = run(&store, "wb-v3").await.unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(store.names().await.unwrap(), vec!["wb-v3".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_on_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let report = run(&store, "wb-v1").await.unwrap();
        assert_eq!(report, ActivateReport::default());
    }

    #[tokio::test]
    async fn test_activate_keeps_going_past_delete_failures() {
        let store = FlakyStore {
            fail_deletes: ["wb-v1".to_string()].into(),
            ..Default::default()
        };
        for name in ["wb-v1", "wb-v2", "wb-v3"] {
            store.open(name).await.unwrap();
        }
        let store = Arc::new(store);

        let report = run(&store, "wb-v3").await.unwrap();
        assert_eq!(report.removed, vec!["wb-v2".to_string()]);
        assert_eq!(report.retained, vec!["wb-v1".to_string()]);

        let mut names = store.names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["wb-v1".to_string(), "wb-v3".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_propagates_listing_failure() {
        let store = Arc::new(FlakyStore { fail_names: true, ..Default::default() });
        let result = run(&store, "wb-v1").await;
        assert!(matches!(result, Err(Error::Database(_) | Error::MigrationFailed(_))));
    }
}
