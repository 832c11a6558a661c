//! Typed views over the raw key/value entries.

use std::collections::BTreeMap;

use buddy_core::model::{AggregateStats, ProblemId, ProblemRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::repository::{Entries, StorageError, StoreKey};

/// Every stored problem, keyed by identifier.
pub type ProblemMap = BTreeMap<ProblemId, ProblemRecord>;

fn ser<E: core::fmt::Display>(key: StoreKey, e: E) -> StorageError {
    StorageError::Serialization(format!("{key}: {e}"))
}

/// Decode one entry. `null` and absent keys both read as `None`.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored JSON has the wrong shape.
pub fn decode<T: DeserializeOwned>(entries: &Entries, key: StoreKey) -> Result<Option<T>, StorageError> {
    match entries.get(&key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ser(key, e)),
    }
}

/// Encode one value into the entry batch.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value cannot be represented as JSON.
pub fn encode<T: Serialize>(entries: &mut Entries, key: StoreKey, value: &T) -> Result<(), StorageError> {
    let value = serde_json::to_value(value).map_err(|e| ser(key, e))?;
    entries.insert(key, value);
    Ok(())
}

/// Reads the credential, treating blank strings as unset.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored value is not a string.
pub fn decode_api_key(entries: &Entries) -> Result<Option<String>, StorageError> {
    let key: Option<String> = decode(entries, StoreKey::ApiKey)?;
    Ok(key.filter(|key| !key.trim().is_empty()))
}

/// # Errors
///
/// Returns `StorageError::Serialization` for malformed stats.
pub fn decode_stats(entries: &Entries) -> Result<AggregateStats, StorageError> {
    Ok(decode(entries, StoreKey::Stats)?.unwrap_or_default())
}

/// # Errors
///
/// Returns `StorageError::Serialization` for malformed records.
pub fn decode_problems(entries: &Entries) -> Result<ProblemMap, StorageError> {
    Ok(decode(entries, StoreKey::Problems)?.unwrap_or_default())
}
