//! Unified error types for fetchwork.
//!
//! A cache miss is deliberately not represented here: lookups return
//! `Option` and absence is an ordinary outcome. Errors cover the cases
//! where a collaborator actually failed.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache, client, and router crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The network fetch itself failed (offline, DNS, connection reset).
    #[error("NETWORK_FAILURE: {0}")]
    NetworkFailed(String),

    /// Fetch exceeded the configured deadline.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response body exceeded the configured size cap.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Upstream answered with a status outside the success range where
    /// one was required (pre-warm refuses to seed the cache with these).
    #[error("BAD_UPSTREAM_STATUS: {0}")]
    BadUpstreamStatus(u16),

    /// Storing a response snapshot failed.
    #[error("CACHE_WRITE_FAILURE: {0}")]
    CacheWriteFailed(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
