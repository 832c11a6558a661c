use std::cmp::Reverse;
use std::sync::Arc;

use buddy_core::model::{AggregateStats, ProblemId, ProblemRecord};
use serde_json::Value;
use storage::codec::{decode_api_key, decode_problems, decode_stats};
use storage::repository::{Entries, KeyValueStore, StoreKey};

use crate::error::DashboardError;

/// How many problems the overview lists.
pub const RECENT_LIMIT: usize = 10;

/// Everything the dashboard shows on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOverview {
    pub has_api_key: bool,
    pub stats: AggregateStats,
    /// Most recently accessed first.
    pub recent: Vec<(ProblemId, ProblemRecord)>,
}

/// Read side of the dashboard plus credential and data management.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn KeyValueStore>,
}

impl DashboardService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if the store cannot be read.
    pub async fn overview(&self) -> Result<DashboardOverview, DashboardError> {
        let entries = self.store.get(&StoreKey::ALL).await?;
        let stats = decode_stats(&entries)?;
        let has_api_key = decode_api_key(&entries)?.is_some();

        let mut recent: Vec<_> = decode_problems(&entries)?.into_iter().collect();
        // Records never accessed sort last.
        recent.sort_by_key(|(_, record)| Reverse(record.last_accessed));
        recent.truncate(RECENT_LIMIT);

        Ok(DashboardOverview {
            has_api_key,
            stats,
            recent,
        })
    }

    /// Store a trimmed credential.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::EmptyApiKey` for blank input, or
    /// `DashboardError::Storage` if the write fails.
    pub async fn save_api_key(&self, key: &str) -> Result<(), DashboardError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(DashboardError::EmptyApiKey);
        }
        self.store
            .set(Entries::from([(StoreKey::ApiKey, Value::String(key.to_string()))]))
            .await?;
        tracing::info!("api key saved");
        Ok(())
    }

    /// Drop stats and every problem record; the credential stays.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if the delete fails.
    pub async fn clear_progress(&self) -> Result<(), DashboardError> {
        self.store
            .remove(&[StoreKey::Stats, StoreKey::Problems])
            .await?;
        tracing::info!("progress cleared");
        Ok(())
    }

    /// Stored notes for one problem. Blank notes read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if the store cannot be read.
    pub async fn notes(&self, problem_id: &ProblemId) -> Result<Option<String>, DashboardError> {
        let entries = self.store.get(&[StoreKey::Problems]).await?;
        let notes = decode_problems(&entries)?
            .remove(problem_id)
            .filter(ProblemRecord::has_notes)
            .and_then(|record| record.notes);
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::time::fixed_now;
    use chrono::Duration;
    use storage::codec::{ProblemMap, encode};
    use storage::repository::InMemoryStore;

    fn id(slug: &str) -> ProblemId {
        format!("https://leetcode.com/problems/{slug}/").parse().unwrap()
    }

    async fn seeded(count: i64) -> (InMemoryStore, DashboardService) {
        let store = InMemoryStore::new();
        let mut problems = ProblemMap::new();
        for n in 0..count {
            let mut record = ProblemRecord {
                title: format!("Problem {n}"),
                ..ProblemRecord::default()
            };
            record.touch(fixed_now() + Duration::minutes(n));
            problems.insert(id(&format!("p{n}")), record);
        }
        let mut entries = Entries::new();
        encode(&mut entries, StoreKey::Problems, &problems).unwrap();
        store.set(entries).await.unwrap();
        let service = DashboardService::new(Arc::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn overview_lists_ten_most_recent() {
        let (_, service) = seeded(12).await;
        let overview = service.overview().await.unwrap();

        assert!(!overview.has_api_key);
        assert_eq!(overview.recent.len(), RECENT_LIMIT);
        assert_eq!(overview.recent[0].1.title, "Problem 11");
        assert_eq!(overview.recent[9].1.title, "Problem 2");
    }

    #[tokio::test]
    async fn blank_key_is_rejected() {
        let (_, service) = seeded(0).await;
        assert!(matches!(
            service.save_api_key("   ").await,
            Err(DashboardError::EmptyApiKey)
        ));
        service.save_api_key("  abc  ").await.unwrap();
        assert!(service.overview().await.unwrap().has_api_key);
    }

    #[tokio::test]
    async fn clear_keeps_credential() {
        let (store, service) = seeded(3).await;
        service.save_api_key("abc").await.unwrap();
        service.clear_progress().await.unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let overview = service.overview().await.unwrap();
        assert!(overview.has_api_key);
        assert!(overview.recent.is_empty());
    }

    #[tokio::test]
    async fn notes_for_unknown_problem_are_none() {
        let (_, service) = seeded(1).await;
        assert_eq!(service.notes(&id("p0")).await.unwrap(), None);
        assert_eq!(service.notes(&id("missing")).await.unwrap(), None);
    }
}
