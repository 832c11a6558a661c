mod markdown_vm;
mod panel_vm;

pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use panel_vm::{ActionVm, HintSlotVm, PanelBody, PanelBodyVm, PanelVm, RegionVm};
