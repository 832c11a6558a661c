use buddy_core::model::{LEETCODE, LOADING_TEXT, PageLocation, ScrapedProblem};

use crate::panel::config::PanelConfig;
use crate::panel::page::{PageDocument, PageSnapshot};

pub const TITLE_SELECTORS: &str = ".text-title-large a, .mr-2.text-label-1";
pub const DESCRIPTION_SELECTORS: &str =
    r#"div[class^="content__"] div[class^="description__"], ._1l1MA"#;

/// Reads title, description and platform from the page.
///
/// Missing elements read as the loading placeholder.
#[must_use]
pub fn scrape(page: &dyn PageDocument, config: &PanelConfig) -> ScrapedProblem {
    let title = page
        .select_text(TITLE_SELECTORS)
        .unwrap_or_else(|| LOADING_TEXT.to_string());
    let description = page
        .select_text(DESCRIPTION_SELECTORS)
        .map(|text| truncate_description(&text, config.description_limit))
        .unwrap_or_else(|| LOADING_TEXT.to_string());
    ScrapedProblem {
        title,
        description,
        platform: LEETCODE.platform.to_string(),
    }
}

fn truncate_description(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

/// Location plus title readiness, or `None` when the location is unreadable.
#[must_use]
pub fn snapshot(page: &dyn PageDocument) -> Option<PageSnapshot> {
    let url = page.location()?;
    Some(PageSnapshot {
        location: PageLocation::new(url),
        title_ready: page.select_text(TITLE_SELECTORS).is_some(),
    })
}
