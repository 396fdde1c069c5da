// src/core/store.rs
//! Durable string key-value store - whole-value overwrite under fixed keys

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use crate::core::FsOps;

/// Key of the raw `/match-jobs/` snapshot.
pub const MATCHED_JOBS_KEY: &str = "matchedJobs";
/// Key of the saved-job records.
pub const SAVED_JOBS_KEY: &str = "savedJobs";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace whatever is stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the store at `database_path`.
    pub async fn open(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                FsOps::ensure_dir_exists(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open store: {}", database_path.display()))?;

        app_log!(debug, "Store opened: {}", database_path.display());

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private store that vanishes with the value. One connection, so every
    /// query sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory store URL")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory store")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create kv_store table")?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key: {}", key))?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write key: {}", key))?;

        app_log!(trace, "Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove key: {}", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert_eq!(store.get(MATCHED_JOBS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_whole_value() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.set(SAVED_JOBS_KEY, "[1,2,3]").await.unwrap();
        store.set(SAVED_JOBS_KEY, "[]").await.unwrap();
        assert_eq!(store.get(SAVED_JOBS_KEY).await.unwrap().as_deref(), Some("[]"));

        store.remove(SAVED_JOBS_KEY).await.unwrap();
        assert_eq!(store.get(SAVED_JOBS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.set(MATCHED_JOBS_KEY, "matches").await.unwrap();
        store.set(SAVED_JOBS_KEY, "saved").await.unwrap();
        assert_eq!(store.get(MATCHED_JOBS_KEY).await.unwrap().as_deref(), Some("matches"));
        assert_eq!(store.get(SAVED_JOBS_KEY).await.unwrap().as_deref(), Some("saved"));
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobmatch.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set(MATCHED_JOBS_KEY, r#"[{"id":"a"}]"#).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get(MATCHED_JOBS_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }
}
