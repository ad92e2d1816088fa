//! Stable request-key derivation for cache entries.

use std::fmt;

use sha2::{Digest, Sha256};
use url::Position;

use crate::request::RequestDescriptor;

/// Content-addressed key identifying one cacheable request.
///
/// Derived from method, URL (fragment stripped), and the Accept header,
/// so a navigation and an asset fetch for the same URL occupy separate
/// slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn for_request(req: &RequestDescriptor) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(req.method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(req.url[..Position::AfterQuery].as_bytes());
        hasher.update(b"\n");
        hasher.update(req.accept().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
