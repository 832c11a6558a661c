use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::ids::ProblemId;

/// Placeholder shown while the page has not rendered a field yet.
pub const LOADING_TEXT: &str = "Loading...";

/// Problem fields read from the page on each (re)initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedProblem {
    pub title: String,
    pub description: String,
    pub platform: String,
}

impl ScrapedProblem {
    #[must_use]
    pub fn loading(platform: impl Into<String>) -> Self {
        Self {
            title: LOADING_TEXT.to_string(),
            description: LOADING_TEXT.to_string(),
            platform: platform.into(),
        }
    }
}

/// A site whose problem pages get a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSite {
    pub platform: &'static str,
    /// Host and path prefix that every problem URL contains.
    pub problem_marker: &'static str,
}

pub const LEETCODE: ProblemSite = ProblemSite {
    platform: "LeetCode",
    problem_marker: "leetcode.com/problems/",
};

impl ProblemSite {
    #[must_use]
    pub fn is_problem_page(&self, url: &Url) -> bool {
        url.as_str().contains(self.problem_marker)
    }
}

/// Where the page currently is, as far as the panel cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The path used to detect client-side navigation.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    #[must_use]
    pub fn problem_id(&self) -> ProblemId {
        ProblemId::from_url(&self.url)
    }
}
