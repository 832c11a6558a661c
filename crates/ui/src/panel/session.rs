use chrono::{DateTime, Utc};

use buddy_core::model::{HintLevel, MAX_HINT_LEVEL, PageLocation, ProblemId, ProblemRecord};

/// Identifies one panel session. Replies tagged with an older epoch are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

pub const HINT_LOADING: &str = "Generating hint...";
pub const SOLUTION_LOADING: &str = "Generating solution...";
pub const REVIEW_LOADING: &str = "Reviewing code...";
pub const EMPTY_REVIEW_NOTICE: &str = "Please paste your code in the text area first.";

/// Display state of one answer area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Hidden,
    Loading(&'static str),
    /// Assistant text, rendered as Markdown.
    Text(String),
    /// Rendered as `Error: <message>`.
    Error(String),
    Notice(&'static str),
    /// Credential is missing; points the user at the dashboard.
    SetupPrompt,
}

impl Region {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Region::Loading(_))
    }
}

/// Which answer area a generation request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTarget {
    Hint(HintLevel),
    Solution,
    Review,
}

/// In-memory state of one live panel. Never persisted as such; `snapshot`
/// produces the record that is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSession {
    pub epoch: SessionEpoch,
    pub location: PageLocation,
    pub problem_id: ProblemId,
    pub record: ProblemRecord,
    pub elapsed: u64,
    pub paused: bool,
    pub collapsed: bool,
    pub hints_unlocked: u8,
    pub solution_visible: bool,
    /// Whole body replaced by the credential prompt.
    pub setup_required: bool,
    pub hint_regions: [Region; MAX_HINT_LEVEL as usize],
    pub solution_region: Region,
    pub review_region: Region,
}

impl PanelSession {
    /// Session for a merged record; progress fields come from the record.
    #[must_use]
    pub fn resume(epoch: SessionEpoch, location: PageLocation, record: ProblemRecord) -> Self {
        let mut hint_regions: [Region; MAX_HINT_LEVEL as usize] = Default::default();
        for level in HintLevel::all() {
            if let Some(text) = record.hint(level) {
                hint_regions[level.index()] = Region::Text(text.to_string());
            }
        }
        let solution_visible = record.solution_viewed;
        let solution_region = match (&record.solution, solution_visible) {
            (Some(text), true) => Region::Text(text.clone()),
            _ => Region::Hidden,
        };

        Self {
            epoch,
            problem_id: location.problem_id(),
            location,
            elapsed: record.time_spent,
            paused: false,
            collapsed: false,
            hints_unlocked: record.hints_used.min(MAX_HINT_LEVEL),
            solution_visible,
            setup_required: false,
            hint_regions,
            solution_region,
            review_region: Region::Hidden,
            record,
        }
    }

    #[must_use]
    pub fn hint_region(&self, level: HintLevel) -> &Region {
        &self.hint_regions[level.index()]
    }

    pub fn hint_region_mut(&mut self, level: HintLevel) -> &mut Region {
        &mut self.hint_regions[level.index()]
    }

    /// The next level that may be requested, if any remain.
    #[must_use]
    pub fn next_hint(&self) -> Option<HintLevel> {
        HintLevel::after(self.hints_unlocked)
    }

    /// Whether the level's trigger is live: it is the next level and its
    /// area has not been used yet. A failed level stays disabled.
    #[must_use]
    pub fn hint_enabled(&self, level: HintLevel) -> bool {
        self.next_hint() == Some(level) && *self.hint_region(level) == Region::Hidden
    }

    #[must_use]
    pub fn solution_enabled(&self) -> bool {
        !self.solution_visible && matches!(self.solution_region, Region::Hidden | Region::Error(_))
    }

    #[must_use]
    pub fn review_enabled(&self) -> bool {
        !self.review_region.is_loading()
    }

    /// Elapsed time not yet written out.
    #[must_use]
    pub fn has_unsaved_time(&self) -> bool {
        self.elapsed > self.record.time_spent
    }

    /// Folds elapsed time into the record and returns the full record to persist.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> ProblemRecord {
        self.record.advance_time(self.elapsed);
        self.record.touch(now);
        self.record.clone()
    }
}
