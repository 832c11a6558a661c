//! The host page as the panel sees it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use buddy_core::model::PageLocation;
use url::Url;

/// Read-only access to the page the panel is injected into.
pub trait PageDocument: Send + Sync {
    /// Current location, `None` if it cannot be parsed.
    fn location(&self) -> Option<Url>;

    /// Rendered text of the first element matching any selector in the
    /// comma-separated list, or `None` when nothing matches.
    fn select_text(&self, selectors: &str) -> Option<String>;
}

/// What a navigation check needs to know about the page at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub location: PageLocation,
    /// The problem title element has rendered.
    pub title_ready: bool,
}

/// A page whose contents are set directly. Clones share state, so a test can
/// keep one handle and navigate while the runtime reads through another.
#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    inner: Arc<Mutex<StaticPageState>>,
}

#[derive(Debug, Default)]
struct StaticPageState {
    url: Option<Url>,
    elements: HashMap<String, String>,
}

impl StaticPage {
    #[must_use]
    pub fn new(url: Url) -> Self {
        let page = Self::default();
        page.navigate(url);
        page
    }

    /// Client-side navigation: the URL changes and the old content goes away.
    pub fn navigate(&self, url: Url) {
        if let Ok(mut state) = self.inner.lock() {
            state.url = Some(url);
            state.elements.clear();
        }
    }

    pub fn set_text(&self, selector: &str, text: impl Into<String>) {
        if let Ok(mut state) = self.inner.lock() {
            state.elements.insert(selector.to_string(), text.into());
        }
    }
}

impl PageDocument for StaticPage {
    fn location(&self) -> Option<Url> {
        self.inner.lock().ok()?.url.clone()
    }

    fn select_text(&self, selectors: &str) -> Option<String> {
        let state = self.inner.lock().ok()?;
        selectors
            .split(',')
            .map(str::trim)
            .find_map(|selector| state.elements.get(selector).cloned())
    }
}
