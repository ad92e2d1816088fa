//! Request model shared by the router and the network client.

use http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use url::Url;

/// How the requesting context initiated the request.
///
/// Only `Navigate` influences routing; the other modes are carried so
/// hosts can hand us their request metadata unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    #[default]
    Cors,
    NoCors,
    SameOrigin,
}

/// An outgoing request as seen by the router: enough of the original
/// to classify it and to derive a stable cache key.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub mode: RequestMode,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), mode: RequestMode::default() }
    }

    /// Plain GET with no headers, the shape pre-warm requests take.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// GET marked as a top-level document load.
    pub fn navigate(url: Url) -> Self {
        Self::get(url).with_mode(RequestMode::Navigate)
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_accept(self, value: &'static str) -> Self {
        self.with_header(header::ACCEPT, HeaderValue::from_static(value))
    }

    /// The Accept header as a string, empty when absent or non-UTF-8.
    pub fn accept(&self) -> &str {
        self.headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Only GET responses are ever recorded into the cache.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
