//! SQLite-backed cache store.
//!
//! One database holds every generation; entries cascade away when their
//! generation row is deleted.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::key::RequestKey;
use super::snapshot::ResponseSnapshot;
use super::store::{CacheHandle, CacheStore};
use crate::Error;

/// Persistent store keeping all generations in one SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: CacheDb,
}

impl SqliteStore {
    /// Open (or create) the database at the given path and apply any
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self { db: CacheDb::open(path).await? })
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Ok(Self { db: CacheDb::open_in_memory().await? })
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    type Handle = SqliteCache;

    async fn open(&self, name: &str) -> Result<SqliteCache, Error> {
        let row_name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![row_name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(SqliteCache { db: self.db.clone(), name: name.to_string() })
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        self.db
            .conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

/// Handle scoped to one generation's rows.
///
/// Writes after the generation row is deleted fail the foreign key
/// check and surface as `Error::Database`.
#[derive(Clone, Debug)]
pub struct SqliteCache {
    db: CacheDb,
    name: String,
}

#[async_trait]
impl CacheHandle for SqliteCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        let generation = self.name.clone();
        let key = key.as_str().to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    "SELECT status, content_type, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND request_key = ?2",
                    params![generation, key],
                    |row| {
                        Ok(ResponseSnapshot {
                            status: row.get::<_, i64>(0)? as u16,
                            content_type: row.get(1)?,
                            headers: serde_json::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
                            body: row.get(3)?,
                            stored_at: row.get(4)?,
                        })
                    },
                );

                match result {
                    Ok(snapshot) => Ok(Some(snapshot)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn store(&self, key: &RequestKey, snapshot: ResponseSnapshot) -> Result<(), Error> {
        let generation = self.name.clone();
        let key = key.as_str().to_string();
        let headers_json = serde_json::to_string(&snapshot.headers).unwrap_or_else(|_| "[]".to_string());
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        generation, request_key, status, content_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(generation, request_key) DO UPDATE SET
                        status = excluded.status,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        generation,
                        key,
                        snapshot.status as i64,
                        &snapshot.content_type,
                        headers_json,
                        &snapshot.body,
                        &snapshot.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
