//! Persistence seam for short name to origin URL records.
//!
//! The registry depends only on [`LinkStore`], so request handling can run
//! against SQLite in production and an in-process map in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::db::Database;

use super::StoreError;

/// Key-value contract for link persistence.
///
/// `insert_if_absent` must be atomic: of two concurrent calls with the same
/// key, exactly one returns `true`. The registry relies on this for name
/// uniqueness and never performs a separate existence check.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Returns the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Stores `value` only if `key` is absent. Returns whether it was stored.
    async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}

/// SQLite-backed store using the `links` table.
#[derive(Debug, Clone)]
pub struct SqliteLinkStore {
    db: Database,
}

impl SqliteLinkStore {
    /// Wraps an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT origin_url FROM links WHERE short_name = ?")
                .bind(key)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.map(|(origin_url,)| origin_url))
    }

    #[instrument(level = "debug", skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO links (short_name, origin_url) VALUES (?, ?) \
             ON CONFLICT(short_name) DO UPDATE SET origin_url = excluded.origin_url",
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, value))]
    async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("INSERT OR IGNORE INTO links (short_name, origin_url) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// In-process store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLinkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }
}
