use std::sync::{Arc, Mutex};

use dioxus::prelude::*;

use crate::panel::PanelView;
use crate::vm::{ActionVm, HintSlotVm, PanelBody, PanelBodyVm, PanelVm, RegionVm};

#[component]
pub fn PanelMarkup(vm: PanelVm) -> Element {
    let panel_class = if vm.collapsed { "collapsed" } else { "" };
    let pause_title = if vm.paused { "Resume Timer" } else { "Pause Timer" };
    let minimize_label = if vm.collapsed { "+" } else { "–" };

    rsx! {
        div { id: "codebuddy-ai-panel", class: "{panel_class}",
            div { class: "cbai-header",
                h2 { "CodeBuddy AI" }
                div { class: "cbai-panel-controls",
                    span { class: "cbai-timer", id: "cbai-timer", "{vm.timer}" }
                    button { class: "cbai-header-btn", id: "cbai-pause-btn", title: "{pause_title}",
                        if vm.paused { "▶" } else { "❚❚" }
                    }
                    button { class: "cbai-header-btn", id: "cbai-refresh-btn", title: "Refresh Panel", "↻" }
                    button { class: "cbai-header-btn", id: "cbai-minimize-btn", title: "Collapse Panel", "{minimize_label}" }
                    button { class: "cbai-header-btn", id: "cbai-close-btn", title: "Close Panel", "×" }
                }
            }
            div { class: "cbai-body",
                match &vm.body {
                    PanelBody::SetupPrompt => rsx! {
                        SetupPrompt {}
                    },
                    PanelBody::Loading => rsx! {
                        div { class: "cbai-problem-info",
                            h3 { id: "cbai-problem-title", "{vm.title}" }
                        }
                    },
                    PanelBody::Ready(body) => rsx! {
                        div { class: "cbai-problem-info",
                            h3 { id: "cbai-problem-title", "{vm.title}" }
                            p { span { id: "cbai-platform", "{vm.platform}" } }
                        }
                        PanelSections { body: body.clone() }
                    },
                }
            }
        }
    }
}

#[component]
fn PanelSections(body: PanelBodyVm) -> Element {
    rsx! {
        div { class: "cbai-section",
            h4 { "AI Assistance" }
            div { class: "cbai-section-content", id: "cbai-actions",
                for slot in body.hints.iter() {
                    HintSlot { key: "{slot.level}", slot: slot.clone() }
                }
                ActionButton {
                    id: "cbai-solution-btn".to_string(),
                    label: "View Solution".to_string(),
                    action: body.solution.clone(),
                }
                RegionArea { id: "cbai-solution-container".to_string(), region: body.solution.region.clone() }
            }
        }
        div { class: "cbai-section",
            h4 { "Code Reviewer" }
            div { class: "cbai-section-content",
                textarea {
                    id: "cbai-code-review-area",
                    class: "cbai-textarea",
                    placeholder: "Paste your code here...",
                }
                ActionButton {
                    id: "cbai-review-btn".to_string(),
                    label: "Review My Code".to_string(),
                    action: body.review.clone(),
                }
                RegionArea { id: "cbai-review-result".to_string(), region: body.review.region.clone() }
            }
        }
        div { class: "cbai-section",
            h4 { "My Notes" }
            div { class: "cbai-section-content",
                textarea {
                    id: "cbai-notes-area",
                    class: "cbai-textarea",
                    placeholder: "Jot down your thoughts...",
                    value: "{body.notes}",
                }
                button { class: "cbai-save-notes-btn", id: "cbai-save-notes-btn", "{body.notes_label}" }
            }
        }
    }
}

#[component]
fn HintSlot(slot: HintSlotVm) -> Element {
    let button_id = format!("cbai-hint-btn-{}", slot.level);
    let container_id = format!("cbai-hint-container-{}", slot.level);
    rsx! {
        button {
            class: "cbai-button cbai-hint-btn",
            id: "{button_id}",
            "data-level": "{slot.level}",
            disabled: !slot.enabled,
            "{slot.label}"
        }
        RegionArea { id: container_id, region: slot.region.clone() }
    }
}

#[component]
fn ActionButton(id: String, label: String, action: ActionVm) -> Element {
    rsx! {
        button { class: "cbai-button", id: "{id}", disabled: !action.enabled, "{label}" }
    }
}

#[component]
fn RegionArea(id: String, region: RegionVm) -> Element {
    match region {
        RegionVm::Hidden => rsx! {},
        RegionVm::Loading(text) => rsx! {
            div { id: "{id}", class: "cbai-display-area loading", "{text}" }
        },
        RegionVm::Html(html) => rsx! {
            div { id: "{id}", class: "cbai-display-area", dangerous_inner_html: "{html}" }
        },
        RegionVm::Error(text) => rsx! {
            div { id: "{id}", class: "cbai-display-area error", "{text}" }
        },
        RegionVm::Notice(text) => rsx! {
            div { id: "{id}", class: "cbai-display-area notice", "{text}" }
        },
        RegionVm::SetupPrompt => rsx! {
            div { id: "{id}", class: "cbai-display-area", SetupPrompt {} }
        },
    }
}

#[component]
fn SetupPrompt() -> Element {
    rsx! {
        div { class: "cbai-api-prompt",
            h4 { "Activate AI Features" }
            p { "To get hints, solutions, and code reviews, please add your Gemini API key." }
            ol {
                li { "Open the CodeBuddy AI dashboard." }
                li { "Paste your key and click Save." }
            }
        }
    }
}

/// Renders the panel to an HTML string.
#[must_use]
pub fn render_panel_markup(vm: &PanelVm) -> String {
    let mut dom = VirtualDom::new_with_props(PanelMarkup, PanelMarkupProps { vm: vm.clone() });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

/// A `PanelView` that keeps the latest markup. Clones share the same output.
#[derive(Clone, Default)]
pub struct HtmlPanelView {
    html: Arc<Mutex<Option<String>>>,
}

impl HtmlPanelView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current markup, `None` while unmounted.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        self.html.lock().ok()?.clone()
    }
}

impl PanelView for HtmlPanelView {
    fn mount(&mut self) {
        if let Ok(mut html) = self.html.lock() {
            html.get_or_insert_with(String::new);
        }
    }

    fn unmount(&mut self) {
        if let Ok(mut html) = self.html.lock() {
            *html = None;
        }
    }

    fn render(&mut self, vm: &PanelVm) {
        let markup = render_panel_markup(vm);
        if let Ok(mut html) = self.html.lock() {
            if html.is_some() {
                *html = Some(markup);
            }
        }
    }
}
