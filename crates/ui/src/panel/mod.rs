//! Content-script side of the assistant panel.

pub mod backend;
pub mod config;
pub mod debounce;
pub mod lifecycle;
pub mod navigation;
pub mod page;
pub mod runtime;
pub mod scraper;
pub mod session;

#[cfg(test)]
mod lifecycle_smoke;

pub use backend::{DispatcherBackend, PanelBackend};
pub use config::PanelConfig;
pub use debounce::{Debounce, DebounceExt};
pub use lifecycle::{
    PanelController, PanelEffect, PanelEvent, PanelPhase, PanelState, UserAction, transition,
};
pub use navigation::{NavigationMemory, Verdict};
pub use page::{PageDocument, PageSnapshot, StaticPage};
pub use runtime::{PanelCommand, PanelRuntime, PanelView};
pub use session::{AiTarget, PanelSession, Region, SessionEpoch};
