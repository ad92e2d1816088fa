//! Install: create the current generation and pre-warm it.

use std::sync::Arc;

use tokio::task::JoinSet;

use fetchwork_client::{CacheMode, Upstream};
use fetchwork_core::{AppConfig, CacheHandle, CacheStore, Error, RequestDescriptor, RequestKey};

/// Outcome of one install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Number of URLs the configuration asked to pre-warm.
    pub requested: u32,
    /// Entries fetched and stored.
    pub warmed: u32,
    /// Entries that failed (network error, non-success status, or
    /// write failure). Failures never abort the rest of the batch.
    pub failed: u32,
}

/// Open the configured generation and pre-warm every configured URL.
///
/// Pre-warm fetches bypass HTTP caches so the stored copies are fresh.
/// Each URL settles independently; install returns only after all of
/// them have.
pub(crate) async fn run<S, U>(store: &Arc<S>, upstream: &Arc<U>, config: &AppConfig) -> Result<InstallReport, Error>
where
    S: CacheStore + Send + Sync + 'static,
    U: Upstream + 'static,
{
    let targets = config.precache_targets().map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let handle = Arc::new(store.open(&config.cache_generation).await?);

    tracing::info!(
        generation = %config.cache_generation,
        targets = targets.len(),
        "install: pre-warming cache"
    );

    let requested = targets.len() as u32;
    let mut join_set = JoinSet::new();
    for url in targets {
        let upstream = Arc::clone(upstream);
        let handle = Arc::clone(&handle);
        join_set.spawn(async move {
            let req = RequestDescriptor::get(url.clone());
            let outcome = warm_one(upstream.as_ref(), handle.as_ref(), &req).await;
            (url, outcome)
        });
    }

    let mut warmed = 0u32;
    let mut failed = 0u32;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => warmed += 1,
            Ok((url, Err(e))) => {
                failed += 1;
                tracing::debug!(url = %url, error = %e, "pre-warm failed");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, "pre-warm task panicked");
            }
        }
    }

    tracing::info!(warmed, failed, "install settled");
    Ok(InstallReport { requested, warmed, failed })
}

async fn warm_one<U, H>(upstream: &U, handle: &H, req: &RequestDescriptor) -> Result<(), Error>
where
    U: Upstream,
    H: CacheHandle,
{
    let key = RequestKey::for_request(req);
    let response = upstream.fetch(req, CacheMode::NoStore).await?;
    if !response.is_success() {
        return Err(Error::BadUpstreamStatus(response.status.as_u16()));
    }
    let snapshot = response
        .to_snapshot()
        .ok_or_else(|| Error::CacheWriteFailed("streamed body cannot be stored".into()))?;
    handle
        .store(&key, snapshot)
        .await
        .map_err(|e| Error::CacheWriteFailed(e.to_string()))
}
