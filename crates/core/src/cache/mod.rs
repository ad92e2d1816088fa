//! Cache storage for response snapshots, organized into generations.
//!
//! A generation is a named bucket of request-key → snapshot entries.
//! Retiring old content means deleting whole generations, never picking
//! through individual entries. Two backends implement the same
//! capability pair:
//!
//! - [`MemoryStore`] for process-local use and tests
//! - [`SqliteStore`] for persistence (WAL mode, schema migrations,
//!   async access via tokio-rusqlite)

pub mod connection;
pub mod key;
pub mod memory;
pub mod migrations;
pub mod snapshot;
pub mod sqlite;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::RequestKey;
pub use memory::{MemoryCache, MemoryStore};
pub use snapshot::ResponseSnapshot;
pub use sqlite::{SqliteCache, SqliteStore};
pub use store::{CacheHandle, CacheStore};
