//! Fetch strategies: how each route class talks to the cache and network.
//!
//! Cache writes never sit on the response path. A successful body is
//! duplicated into a snapshot and stored from a detached task; whatever
//! happens there is logged and swallowed. Lookups that fail inside the
//! store are downgraded to misses so a broken cache degrades the router
//! to plain pass-through instead of taking it down.

use std::sync::Arc;

use url::Url;

use fetchwork_client::{CacheMode, FetchResponse, Upstream};
use fetchwork_core::{CacheHandle, CacheStore, Error, RequestDescriptor, RequestKey, ResponseSnapshot};

/// Hand the request straight to the network, body streamed through.
pub(crate) async fn passthrough<U: Upstream>(
    upstream: &U,
    req: &RequestDescriptor,
) -> Result<FetchResponse, Error> {
    upstream.fetch_stream(req, CacheMode::NoStore).await
}

/// Network first. On success the response is returned as-is; with
/// `record` set, GET responses are also copied into the current
/// generation from a detached task. On failure the request falls back
/// to the cache, and a miss there surfaces the original network error.
pub(crate) async fn network_first<S, U>(
    store: &Arc<S>,
    upstream: &U,
    req: &RequestDescriptor,
    generation: &str,
    mode: CacheMode,
    record: bool,
) -> Result<FetchResponse, Error>
where
    S: CacheStore + Send + Sync + 'static,
    U: Upstream,
{
    let key = RequestKey::for_request(req);
    match upstream.fetch(req, mode).await {
        Ok(response) => {
            if record && req.is_get() && let Some(snapshot) = response.to_snapshot() {
                store_detached(store, generation, key, snapshot, &req.url);
            }
            Ok(response)
        }
        Err(network_err) => {
            tracing::debug!(url = %req.url, error = %network_err, "network failed, trying cache");
            match lookup(store, generation, &key).await {
                Some(snapshot) => {
                    tracing::debug!(url = %req.url, "cache fallback hit");
                    Ok(FetchResponse::from_snapshot(req.url.clone(), snapshot))
                }
                None => Err(network_err),
            }
        }
    }
}

/// Cache first. On a hit the network is never consulted; on a miss the
/// response is fetched, recorded, and returned. A network failure on
/// the miss path propagates: there is nothing to synthesize from.
pub(crate) async fn cache_first<S, U>(
    store: &Arc<S>,
    upstream: &U,
    req: &RequestDescriptor,
    generation: &str,
) -> Result<FetchResponse, Error>
where
    S: CacheStore + Send + Sync + 'static,
    U: Upstream,
{
    let key = RequestKey::for_request(req);
    if let Some(snapshot) = lookup(store, generation, &key).await {
        tracing::debug!(url = %req.url, "cache hit");
        return Ok(FetchResponse::from_snapshot(req.url.clone(), snapshot));
    }

    tracing::debug!(url = %req.url, "cache miss, fetching");
    let response = upstream.fetch(req, CacheMode::Default).await?;
    if req.is_get() && let Some(snapshot) = response.to_snapshot() {
        store_detached(store, generation, key, snapshot, &req.url);
    }
    Ok(response)
}

/// Current-generation lookup where any store error counts as a miss.
async fn lookup<S: CacheStore>(
    store: &Arc<S>,
    generation: &str,
    key: &RequestKey,
) -> Option<ResponseSnapshot> {
    let result = async {
        let handle = store.open(generation).await?;
        handle.lookup(key).await
    }
    .await;

    match result {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(generation, error = %e, "cache lookup failed, treating as miss");
            None
        }
    }
}

/// Record a snapshot from a detached task. The response has already
/// left, so failures are logged and swallowed.
fn store_detached<S>(store: &Arc<S>, generation: &str, key: RequestKey, snapshot: ResponseSnapshot, url: &Url)
where
    S: CacheStore + Send + Sync + 'static,
{
    let store = Arc::clone(store);
    let generation = generation.to_string();
    let url = url.clone();
    tokio::spawn(async move {
        let result = async {
            let handle = store.open(&generation).await?;
            handle.store(&key, snapshot).await
        }
        .await;

        if let Err(e) = result {
            tracing::debug!(url = %url, error = %e, "background cache write failed");
        }
    });
}
