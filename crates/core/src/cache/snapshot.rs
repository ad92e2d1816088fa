//! Stored response snapshots.

use http::{HeaderMap, HeaderName, HeaderValue, header};
use serde::{Deserialize, Serialize};

/// A response captured into the cache.
///
/// Holds the complete body plus enough metadata to replay the response
/// later. Snapshots are only ever taken from fully buffered responses;
/// streamed bodies never reach the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl ResponseSnapshot {
    /// Capture a snapshot from response parts, stamping the current time.
    pub fn capture(status: u16, headers: &HeaderMap, body: Vec<u8>) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();
        Self { status, content_type, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// Rebuild the header map for replay, skipping pairs that no longer
    /// parse as valid header names or values.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
                map.insert(name, value);
            }
        }
        map
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
