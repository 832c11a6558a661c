#![forbid(unsafe_code)]

pub mod panel;
pub mod views;
pub mod vm;

pub use panel::{DispatcherBackend, PanelCommand, PanelConfig, PanelController, PanelRuntime};
pub use views::HtmlPanelView;
