use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{Entries, KeyValueStore, StorageError, StoreKey};

use super::SqliteStore;

fn conn(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[StoreKey]) -> Result<Entries, StorageError> {
        let mut found = Entries::with_capacity(keys.len());
        for key in keys {
            let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;
            let Some(row) = row else {
                continue;
            };
            let raw: String = row
                .try_get("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            let value = serde_json::from_str(&raw)
                .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
            found.insert(*key, value);
        }
        Ok(found)
    }

    async fn set(&self, entries: Entries) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for (key, value) in entries {
            let raw = serde_json::to_string(&value)
                .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
            sqlx::query(
                r"
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key.as_str())
            .bind(raw)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn remove(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for key in keys {
            sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
                .bind(key.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
