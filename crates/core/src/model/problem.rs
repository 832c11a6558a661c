use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::hint::{HintError, HintLevel, MAX_HINT_LEVEL};
use crate::model::page::ScrapedProblem;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error(transparent)]
    Hint(#[from] HintError),

    #[error("solution text cannot be empty")]
    EmptySolution,
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Persisted progress for one problem.
///
/// Serialized with camelCase keys so the stored layout matches the message
/// protocol (`timeSpent`, `hintsUsed`, `solutionViewed`, ...). Every field has a
/// default so partially written records still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemRecord {
    pub title: String,
    pub description: String,
    pub platform: String,
    pub url: String,
    /// Seconds spent on the problem.
    pub time_spent: u64,
    pub hints_used: u8,
    /// Revealed hint texts; index is `level - 1`, `None` for gaps.
    pub hints: Vec<Option<String>>,
    pub solution_viewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ProblemRecord {
    /// A fresh record for a problem seen for the first time.
    #[must_use]
    pub fn from_scrape(scraped: &ScrapedProblem, url: impl Into<String>) -> Self {
        Self {
            title: scraped.title.clone(),
            description: scraped.description.clone(),
            platform: scraped.platform.clone(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Combines a fresh scrape with whatever was stored for the problem.
    ///
    /// Title and platform always come from the scrape, as does the URL. The
    /// description falls back to the stored one. Progress fields (time, hints,
    /// solution, notes) always come from storage.
    #[must_use]
    pub fn merge_scraped(
        stored: Option<ProblemRecord>,
        scraped: &ScrapedProblem,
        url: impl Into<String>,
    ) -> Self {
        match stored {
            None => Self::from_scrape(scraped, url),
            Some(stored) => Self {
                title: scraped.title.clone(),
                platform: scraped.platform.clone(),
                url: url.into(),
                description: if scraped.description.is_empty() {
                    stored.description
                } else {
                    scraped.description.clone()
                },
                ..stored
            },
        }
    }

    /// Hint text for a level, if it was revealed.
    #[must_use]
    pub fn hint(&self, level: HintLevel) -> Option<&str> {
        self.hints.get(level.index()).and_then(|hint| hint.as_deref())
    }

    /// Stores a hint for the level that immediately follows `hints_used`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Hint` if the level is not the next one in order.
    pub fn record_hint(&mut self, level: HintLevel, text: impl Into<String>) -> Result<(), RecordError> {
        level.ensure_next(self.hints_used)?;
        if self.hints.len() <= level.index() {
            self.hints.resize(level.index() + 1, None);
        }
        self.hints[level.index()] = Some(text.into());
        self.hints_used = level.value().min(MAX_HINT_LEVEL);
        Ok(())
    }

    /// Marks the solution as viewed. Once viewed the stored text never changes.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::EmptySolution` for blank text.
    pub fn record_solution(&mut self, text: impl Into<String>) -> Result<(), RecordError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RecordError::EmptySolution);
        }
        if !self.solution_viewed {
            self.solution_viewed = true;
            self.solution = Some(text);
        }
        Ok(())
    }

    /// Raises the time spent; never lowers it.
    pub fn advance_time(&mut self, seconds: u64) {
        self.time_spent = self.time_spent.max(seconds);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    pub fn clear_notes(&mut self) {
        self.notes = None;
    }

    #[must_use]
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|notes| !notes.is_empty())
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_accessed = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn scraped(title: &str) -> ScrapedProblem {
        ScrapedProblem {
            title: title.to_string(),
            description: "Given an array...".to_string(),
            platform: "LeetCode".to_string(),
        }
    }

    #[test]
    fn merge_keeps_progress_and_refreshes_title() {
        let mut stored = ProblemRecord::from_scrape(&scraped("Old"), "u");
        stored.time_spent = 90;
        stored.record_hint(HintLevel::FIRST, "Try sorting.").unwrap();
        stored.set_notes("two pointers");

        let merged = ProblemRecord::merge_scraped(Some(stored), &scraped("1. Two Sum"), "u2");
        assert_eq!(merged.title, "1. Two Sum");
        assert_eq!(merged.url, "u2");
        assert_eq!(merged.time_spent, 90);
        assert_eq!(merged.hints_used, 1);
        assert_eq!(merged.notes.as_deref(), Some("two pointers"));
    }

    #[test]
    fn record_hint_requires_sequence() {
        let mut record = ProblemRecord::default();
        let second = HintLevel::new(2).unwrap();
        assert!(record.record_hint(second, "skip").is_err());

        record.record_hint(HintLevel::FIRST, "Try sorting.").unwrap();
        record.record_hint(second, "Use a map.").unwrap();
        assert_eq!(record.hints_used, 2);
        assert_eq!(record.hint(second), Some("Use a map."));
    }

    #[test]
    fn solution_is_one_way() {
        let mut record = ProblemRecord::default();
        record.record_solution("first").unwrap();
        record.record_solution("second").unwrap();
        assert!(record.solution_viewed);
        assert_eq!(record.solution.as_deref(), Some("first"));
        assert_eq!(record.record_solution("  "), Err(RecordError::EmptySolution));
    }

    #[test]
    fn time_never_decreases() {
        let mut record = ProblemRecord::default();
        record.advance_time(40);
        record.advance_time(10);
        assert_eq!(record.time_spent, 40);
    }

    #[test]
    fn serializes_with_protocol_field_names() {
        let mut record = ProblemRecord::from_scrape(&scraped("Two Sum"), "u");
        record.touch(fixed_now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timeSpent"], 0);
        assert_eq!(json["hintsUsed"], 0);
        assert_eq!(json["solutionViewed"], false);
        assert_eq!(json["lastAccessed"], 1_700_000_000_000_i64);
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn loads_sparse_stored_hints() {
        let json = r#"{"title":"T","hints":["a",null,"c"],"hintsUsed":3}"#;
        let record: ProblemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.hint(HintLevel::new(2).unwrap()), None);
        assert_eq!(record.hint(HintLevel::new(3).unwrap()), Some("c"));
        assert_eq!(record.time_spent, 0);
    }
}
