//! Network fetch capability.
//!
//! ### Response shapes
//! - Buffered: the whole body is read up-front (subject to `max_bytes`)
//!   and can be duplicated into a cache snapshot.
//! - Streamed: the body is handed through chunk by chunk and is never
//!   buffered, so it can never be snapshotted.
//!
//! ### Cache bypass
//! `CacheMode::NoStore` marks a fetch that must not be answered from or
//! recorded into any HTTP cache along the way.

pub mod upstream;

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use http::{HeaderMap, StatusCode};
use url::Url;

pub use upstream::{HttpUpstream, Upstream};

use fetchwork_core::{AppConfig, Error, ResponseSnapshot};

/// Cache interaction requested from the HTTP layer for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// No opinion; intermediaries apply their defaults.
    #[default]
    Default,
    /// Bypass HTTP caches in both directions.
    NoStore,
}

/// Configuration for the HTTP upstream.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "fetchwork/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes for buffered fetches (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "fetchwork/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Self::default()
        }
    }
}

/// Body of a fetched response.
pub enum FetchBody {
    /// Complete, buffered body.
    Full(Bytes),
    /// Pass-through body; consuming it drives the underlying connection.
    Stream(BoxStream<'static, Result<Bytes, Error>>),
}

impl FetchBody {
    /// The buffered bytes, or `None` for a streamed body.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            FetchBody::Full(bytes) => Some(bytes),
            FetchBody::Stream(_) => None,
        }
    }
}

impl fmt::Debug for FetchBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchBody::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            FetchBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body
    pub body: FetchBody,
    /// Response headers
    pub headers: HeaderMap,
    /// Time taken to fetch in milliseconds (0 for cache replays)
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Duplicate the response into a cacheable snapshot.
    ///
    /// Returns `None` for streamed bodies, which never reach the cache.
    pub fn to_snapshot(&self) -> Option<ResponseSnapshot> {
        let bytes = self.body.as_bytes()?;
        Some(ResponseSnapshot::capture(self.status.as_u16(), &self.headers, bytes.to_vec()))
    }

    /// Replay a stored snapshot as a response for the given request URL.
    pub fn from_snapshot(url: Url, snapshot: ResponseSnapshot) -> Self {
        let status = StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = snapshot.header_map();
        Self {
            url: url.clone(),
            final_url: url,
            status,
            content_type: snapshot.content_type,
            body: FetchBody::Full(Bytes::from(snapshot.body)),
            headers,
            fetch_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn full_response(body: &'static [u8]) -> FetchResponse {
        FetchResponse {
            url: url("https://example.com/"),
            final_url: url("https://example.com/"),
            status: StatusCode::OK,
            content_type: Some("text/html".to_string()),
            body: FetchBody::Full(Bytes::from_static(body)),
            headers: HeaderMap::new(),
            fetch_ms: 12,
        }
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "fetchwork/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "wb/2".into(), max_bytes: 1024, timeout_ms: 500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "wb/2");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_snapshot_roundtrip_for_full_body() {
        let response = full_response(b"<html></html>");
        let snapshot = response.to_snapshot().unwrap();
        assert_eq!(snapshot.status, 200);
        assert_eq!(snapshot.body, b"<html></html>");

        let replayed = FetchResponse::from_snapshot(url("https://example.com/"), snapshot);
        assert_eq!(replayed.status, StatusCode::OK);
        assert_eq!(replayed.body.as_bytes().unwrap().as_ref(), b"<html></html>");
        assert_eq!(replayed.fetch_ms, 0);
    }

    #[test]
    fn test_streamed_body_has_no_snapshot() {
        let stream = futures_util::stream::iter(vec![Ok(Bytes::from_static(b"data: 1\n\n"))]).boxed();
        let response = FetchResponse { body: FetchBody::Stream(stream), ..full_response(b"") };
        assert!(response.body.as_bytes().is_none());
        assert!(response.to_snapshot().is_none());
        assert_eq!(format!("{:?}", response.body), "Stream(..)");
    }

    #[tokio::test]
    async fn test_streamed_body_drains_in_order() {
        let chunks = vec![
            Ok(Bytes::from_static(b"data: 1\n\n")),
            Ok(Bytes::from_static(b"data: 2\n\n")),
        ];
        let stream = futures_util::stream::iter(chunks).boxed();
        let response = FetchResponse { body: FetchBody::Stream(stream), ..full_response(b"") };

        let FetchBody::Stream(stream) = response.body else {
            panic!("expected a streamed body");
        };
        let collected: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(collected, vec![Bytes::from_static(b"data: 1\n\n"), Bytes::from_static(b"data: 2\n\n")]);
    }
}
