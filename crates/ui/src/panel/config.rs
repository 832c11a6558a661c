use std::time::Duration;

/// Timings and limits for one panel runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelConfig {
    /// Quiet period before a burst of page mutations is evaluated.
    pub debounce: Duration,
    pub tick: Duration,
    /// Elapsed seconds between periodic flushes.
    pub flush_every: u64,
    /// Characters kept from the scraped description.
    pub description_limit: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            tick: Duration::from_secs(1),
            flush_every: 30,
            description_limit: 500,
        }
    }
}
