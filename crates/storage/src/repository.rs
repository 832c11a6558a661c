use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Top-level keys of the persisted namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// The generation credential (opaque string).
    ApiKey,
    /// `AggregateStats`.
    Stats,
    /// Map from problem identifier to `ProblemRecord`.
    Problems,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [StoreKey::ApiKey, StoreKey::Stats, StoreKey::Problems];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::ApiKey => "apiKey",
            StoreKey::Stats => "stats",
            StoreKey::Problems => "problems",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A batch of key/value pairs read from or written to a store.
pub type Entries = HashMap<StoreKey, Value>;

/// Persistence gateway contract: flat key/value access, no transactions.
///
/// Callers that merge must read before they write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the requested keys. Missing keys are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, keys: &[StoreKey]) -> Result<Entries, StorageError>;

    /// Write every entry, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, entries: Entries) -> Result<(), StorageError>;

    /// Delete the given keys; absent keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, keys: &[StoreKey]) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<Entries>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, keys: &[StoreKey]) -> Result<Entries, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(keys
            .iter()
            .filter_map(|key| guard.get(key).map(|value| (*key, value.clone())))
            .collect())
    }

    async fn set(&self, entries: Entries) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(key);
        }
        Ok(())
    }
}

/// Holds the configured store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_returns_only_present_keys() {
        let store = InMemoryStore::new();
        store
            .set(Entries::from([(StoreKey::ApiKey, json!("secret"))]))
            .await
            .unwrap();

        let found = store.get(&StoreKey::ALL).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&StoreKey::ApiKey], json!("secret"));
    }

    #[tokio::test]
    async fn remove_keeps_other_keys() {
        let store = InMemoryStore::new();
        store
            .set(Entries::from([
                (StoreKey::ApiKey, json!("secret")),
                (StoreKey::Stats, json!({"totalProblems": 1})),
            ]))
            .await
            .unwrap();

        store.remove(&[StoreKey::Stats, StoreKey::Problems]).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&[StoreKey::Stats]).await.unwrap().is_empty());
    }
}
