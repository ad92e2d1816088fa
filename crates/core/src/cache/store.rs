//! Capability traits for cache storage backends.

use async_trait::async_trait;

use super::key::RequestKey;
use super::snapshot::ResponseSnapshot;
use crate::Error;

/// A handle scoped to one named generation.
///
/// Absence is an ordinary outcome: `lookup` returns `Ok(None)` for a
/// miss and reserves `Err` for backend failures.
#[async_trait]
pub trait CacheHandle: Send + Sync {
    /// The generation name this handle is scoped to.
    fn name(&self) -> &str;

    /// Fetch the snapshot stored under a request key, if any.
    async fn lookup(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error>;

    /// Insert or replace the snapshot stored under a request key.
    async fn store(&self, key: &RequestKey, snapshot: ResponseSnapshot) -> Result<(), Error>;
}

/// Storage capability handed to the router: named generations of
/// request-key → snapshot entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    type Handle: CacheHandle + 'static;

    /// Open the generation with this name, creating it if needed.
    async fn open(&self, name: &str) -> Result<Self::Handle, Error>;

    /// Names of every generation currently present.
    async fn names(&self) -> Result<Vec<String>, Error>;

    /// Delete a generation and everything in it.
    ///
    /// Returns whether the generation existed. Handles opened before the
    /// deletion go stale; what their operations do afterwards is backend
    /// specific.
    async fn delete(&self, name: &str) -> Result<bool, Error>;
}
