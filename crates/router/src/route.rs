//! Request classification.
//!
//! Every request falls into exactly one class, decided by running the
//! checks in a fixed order and taking the first match.

use std::fmt;

use fetchwork_core::RequestDescriptor;

/// Policy class a request routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Live event stream, passed through to the network untouched.
    Stream,
    /// API call: freshest data wins, cached data only as a fallback.
    Api,
    /// Document load: network first, cache as the offline fallback.
    Navigation,
    /// Static asset: cache first, network on miss.
    Asset,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Stream => "stream",
            RouteClass::Api => "api",
            RouteClass::Navigation => "navigation",
            RouteClass::Asset => "asset",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request.
///
/// The stream check must run before the API check: event streams live
/// under the API prefix, and buffering one through the API policy would
/// hang the subscriber.
pub fn classify(req: &RequestDescriptor, api_prefix: &str) -> RouteClass {
    if req.accept().contains("text/event-stream") {
        return RouteClass::Stream;
    }
    if req.url.path().starts_with(api_prefix) {
        return RouteClass::Api;
    }
    if req.is_navigation() || req.accept().contains("text/html") {
        return RouteClass::Navigation;
    }
    RouteClass::Asset
}
