//! Test doubles and helpers shared by the router tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use url::Url;

use fetchwork_client::{CacheMode, FetchBody, FetchResponse, Upstream};
use fetchwork_core::cache::MemoryCache;
use fetchwork_core::{
    AppConfig, CacheHandle, CacheStore, Error, MemoryStore, RequestDescriptor, RequestKey, ResponseSnapshot,
};

pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub(crate) fn get(s: &str) -> RequestDescriptor {
    RequestDescriptor::get(url(s))
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig { cache_generation: "test-v1".into(), ..Default::default() }
}

/// Store a snapshot for this request directly, bypassing the router.
pub(crate) async fn seed<S: CacheStore>(
    store: &S,
    generation: &str,
    req: &RequestDescriptor,
    status: u16,
    body: &[u8],
) {
    let handle = store.open(generation).await.unwrap();
    let snapshot = ResponseSnapshot::capture(status, &HeaderMap::new(), body.to_vec());
    handle.store(&RequestKey::for_request(req), snapshot).await.unwrap();
}

pub(crate) async fn has_entry<S: CacheStore>(store: &S, generation: &str, key: &RequestKey) -> bool {
    let handle = store.open(generation).await.unwrap();
    handle.lookup(key).await.unwrap().is_some()
}

/// Poll for a detached cache write to land; panics if it never does.
pub(crate) async fn wait_for_entry<S: CacheStore>(store: &S, generation: &str, key: &RequestKey) {
    for _ in 0..50 {
        if has_entry(store, generation, key).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("entry for {key} never appeared in generation {generation}");
}

#[derive(Clone)]
enum Reply {
    Ok { status: u16, content_type: &'static str, body: &'static [u8] },
    Fail(&'static str),
}

/// Scripted upstream: replies keyed by URL, with call counting.
#[derive(Default)]
pub(crate) struct StubUpstream {
    replies: Mutex<HashMap<String, Reply>>,
    fetch_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    last_mode: Mutex<Option<CacheMode>>,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, content_type: &'static str, body: &'static [u8]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Ok { status: 200, content_type, body });
        self
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Ok { status, content_type: "text/plain", body: b"" });
        self
    }

    pub fn fail(self, url: &str, message: &'static str) -> Self {
        self.set_fail(url, message);
        self
    }

    /// Re-script a URL to fail, e.g. to simulate going offline mid-test.
    pub fn set_fail(&self, url: &str, message: &'static str) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Fail(message));
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn last_mode(&self) -> Option<CacheMode> {
        *self.last_mode.lock().unwrap()
    }

    fn reply_for(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error> {
        *self.last_mode.lock().unwrap() = Some(mode);
        let reply = self.replies.lock().unwrap().get(req.url.as_str()).cloned();
        match reply {
            Some(Reply::Ok { status, content_type, body }) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                Ok(FetchResponse {
                    url: req.url.clone(),
                    final_url: req.url.clone(),
                    status: StatusCode::from_u16(status).unwrap(),
                    content_type: Some(content_type.to_string()),
                    body: FetchBody::Full(Bytes::from_static(body)),
                    headers,
                    fetch_ms: 1,
                })
            }
            Some(Reply::Fail(message)) => Err(Error::NetworkFailed(message.to_string())),
            None => Err(Error::NetworkFailed(format!("no stubbed reply for {}", req.url))),
        }
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn fetch(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.reply_for(req, mode)
    }

    async fn fetch_stream(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.reply_for(req, mode)?;
        let bytes = response.body.as_bytes().cloned().unwrap_or_default();
        Ok(FetchResponse {
            body: FetchBody::Stream(futures_util::stream::iter(vec![Ok(bytes)]).boxed()),
            ..response
        })
    }
}

fn storage_error() -> Error {
    Error::MigrationFailed("simulated storage failure".into())
}

/// Store wrapper that fails selected operations.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_opens: bool,
    pub fail_names: bool,
    pub fail_deletes: HashSet<String>,
}

#[async_trait]
impl CacheStore for FlakyStore {
    type Handle = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache, Error> {
        if self.fail_opens {
            return Err(storage_error());
        }
        self.inner.open(name).await
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        if self.fail_names {
            return Err(storage_error());
        }
        self.inner.names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.fail_deletes.contains(name) {
            return Err(storage_error());
        }
        self.inner.delete(name).await
    }
}
