//! In-memory cache store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::key::RequestKey;
use super::snapshot::ResponseSnapshot;
use super::store::{CacheHandle, CacheStore};
use crate::Error;

type Entries = HashMap<String, ResponseSnapshot>;

/// Process-local store for hosts that don't need persistence, and the
/// default backend in tests. All clones share the same generations.
#[derive(Clone, Default)]
pub struct MemoryStore {
    generations: Arc<RwLock<HashMap<String, Arc<RwLock<Entries>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    type Handle = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache, Error> {
        let mut generations = self.generations.write().await;
        let entries = Arc::clone(generations.entry(name.to_string()).or_default());
        Ok(MemoryCache { name: name.to_string(), entries })
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = self.generations.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        Ok(self.generations.write().await.remove(name).is_some())
    }
}

/// Handle onto one in-memory generation.
///
/// Remains usable after the generation is deleted from the store, but
/// writes land in a detached map nobody else can see.
#[derive(Clone)]
pub struct MemoryCache {
    name: String,
    entries: Arc<RwLock<Entries>>,
}

#[async_trait]
impl CacheHandle for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        Ok(self.entries.read().await.get(key.as_str()).cloned())
    }

    async fn store(&self, key: &RequestKey, snapshot: ResponseSnapshot) -> Result<(), Error> {
        self.entries.write().await.insert(key.as_str().to_string(), snapshot);
        Ok(())
    }
}
