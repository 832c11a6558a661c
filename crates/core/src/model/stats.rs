use serde::{Deserialize, Serialize};

use crate::model::problem::ProblemRecord;

/// Process-wide progress summary. Only ever changed by applying a `StatsDelta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateStats {
    pub total_problems: u64,
    /// Seconds.
    pub total_time: u64,
    pub total_hints: u64,
    pub total_solutions: u64,
}

impl AggregateStats {
    pub fn apply(&mut self, delta: StatsDelta) {
        self.total_problems = self.total_problems.saturating_add(delta.problems);
        self.total_time = self.total_time.saturating_add(delta.time);
        self.total_hints = self.total_hints.saturating_add(delta.hints);
        self.total_solutions = self.total_solutions.saturating_add(delta.solutions);
    }

    #[must_use]
    pub fn with(mut self, delta: StatsDelta) -> Self {
        self.apply(delta);
        self
    }
}

/// Increments produced by one record upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsDelta {
    pub problems: u64,
    pub time: u64,
    pub hints: u64,
    pub solutions: u64,
}

impl StatsDelta {
    /// Computes what an upsert from `old` to `new` adds to the aggregate.
    ///
    /// - a problem counts once, when the prior record has no title;
    /// - time and hints count only their positive difference;
    /// - a solution counts on the false → true transition.
    #[must_use]
    pub fn between(old: Option<&ProblemRecord>, new: &ProblemRecord) -> Self {
        let (old_title_empty, old_time, old_hints, old_solution) = match old {
            Some(old) => (
                old.title.is_empty(),
                old.time_spent,
                old.hints_used,
                old.solution_viewed,
            ),
            None => (true, 0, 0, false),
        };

        Self {
            problems: u64::from(old_title_empty),
            time: new.time_spent.saturating_sub(old_time),
            hints: u64::from(new.hints_used.saturating_sub(old_hints)),
            solutions: u64::from(new.solution_viewed && !old_solution),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
