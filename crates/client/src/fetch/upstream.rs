//! Upstream fetch capability and its reqwest implementation.

use std::time::Instant;

use async_trait::async_trait;
use futures_util::StreamExt;
use http::{HeaderMap, HeaderValue, header};
use reqwest::Client;

use fetchwork_core::{Error, RequestDescriptor};

use super::{CacheMode, FetchBody, FetchConfig, FetchResponse};

/// Network capability handed to the router.
///
/// Non-success statuses are responses, not errors; `Err` is reserved for
/// failing to produce a response at all (DNS, refused connection,
/// timeout, oversized body).
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch and buffer the complete response body.
    async fn fetch(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error>;

    /// Fetch without buffering; the body is handed through as a stream.
    async fn fetch_stream(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error>;
}

/// HTTP upstream backed by reqwest.
pub struct HttpUpstream {
    http: Client,
    config: FetchConfig,
}

impl HttpUpstream {
    /// Create a new upstream with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::NetworkFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn build_request(&self, req: &RequestDescriptor, mode: CacheMode) -> reqwest::RequestBuilder {
        let mut headers = req.headers.clone();
        if mode == CacheMode::NoStore {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }
        self.http.request(req.method.clone(), req.url.clone()).headers(headers)
    }
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::FetchTimeout(e.to_string())
    } else {
        Error::NetworkFailed(e.to_string())
    }
}

fn content_type_of(headers: &HeaderMap) -> Option<String> {
    headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(|s| s.to_string())
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let response = self.build_request(req, mode).send().await.map_err(send_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkFailed(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let content_type = content_type_of(&headers);
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes, status {})",
            req.url,
            final_url,
            fetch_ms,
            bytes.len(),
            status.as_u16()
        );

        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status,
            content_type,
            body: FetchBody::Full(bytes),
            headers,
            fetch_ms,
        })
    }

    async fn fetch_stream(&self, req: &RequestDescriptor, mode: CacheMode) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let response = self.build_request(req, mode).send().await.map_err(send_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let content_type = content_type_of(&headers);
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "streaming {} ({}, status {})",
            req.url,
            content_type.as_deref().unwrap_or("unknown"),
            status.as_u16()
        );

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::NetworkFailed(format!("stream error: {}", e))))
            .boxed();

        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status,
            content_type,
            body: FetchBody::Stream(stream),
            headers,
            fetch_ms,
        })
    }
}
