mod panel;

#[cfg(test)]
mod view_smoke;

pub use panel::{HtmlPanelView, PanelMarkup, render_panel_markup};
