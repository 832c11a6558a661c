//! Decides what a settled page means for the panel.

use buddy_core::model::{LEETCODE, ProblemSite};

use crate::panel::page::PageSnapshot;

/// Outcome of one navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not a supported problem page; any panel goes away.
    OffContext,
    /// The user closed the panel on this path.
    Suppressed,
    /// Supported page, but the title has not rendered yet.
    NotReady,
    /// Same path, panel already present.
    Unchanged,
    /// No panel yet: create one.
    Initialize,
    /// Path changed under an existing panel: tear down and recreate.
    Reset,
}

/// What the controller remembers between checks. Outlives any one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationMemory {
    pub last_path: Option<String>,
    pub closed_by_user: bool,
}

impl NavigationMemory {
    #[must_use]
    pub fn is_same_path(&self, page: &PageSnapshot) -> bool {
        self.last_path.as_deref() == Some(page.location.path())
    }
}

/// Classifies a page for the default site.
#[must_use]
pub fn assess(page: &PageSnapshot, memory: &NavigationMemory, panel_present: bool) -> Verdict {
    assess_for(&LEETCODE, page, memory, panel_present)
}

#[must_use]
pub fn assess_for(
    site: &ProblemSite,
    page: &PageSnapshot,
    memory: &NavigationMemory,
    panel_present: bool,
) -> Verdict {
    if !site.is_problem_page(page.location.url()) {
        return Verdict::OffContext;
    }
    let same_path = memory.is_same_path(page);
    if memory.closed_by_user && same_path {
        return Verdict::Suppressed;
    }
    if !page.title_ready {
        return Verdict::NotReady;
    }
    match (same_path, panel_present) {
        (false, true) => Verdict::Reset,
        (true, true) => Verdict::Unchanged,
        (_, false) => Verdict::Initialize,
    }
}
