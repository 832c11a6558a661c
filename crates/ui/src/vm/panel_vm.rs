use buddy_core::model::{HintLevel, LOADING_TEXT};
use buddy_core::time::format_elapsed;

use crate::panel::{PanelController, PanelSession, PanelState, Region};
use crate::vm::markdown_vm::markdown_to_html;

/// Answer area, ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionVm {
    Hidden,
    Loading(String),
    /// Sanitized HTML.
    Html(String),
    Error(String),
    Notice(String),
    SetupPrompt,
}

impl From<&Region> for RegionVm {
    fn from(region: &Region) -> Self {
        match region {
            Region::Hidden => RegionVm::Hidden,
            Region::Loading(text) => RegionVm::Loading((*text).to_string()),
            Region::Text(text) => RegionVm::Html(markdown_to_html(text)),
            Region::Error(message) => RegionVm::Error(format!("Error: {message}")),
            Region::Notice(text) => RegionVm::Notice((*text).to_string()),
            Region::SetupPrompt => RegionVm::SetupPrompt,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintSlotVm {
    pub level: u8,
    pub label: String,
    pub enabled: bool,
    pub region: RegionVm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionVm {
    pub enabled: bool,
    pub region: RegionVm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelBodyVm {
    pub hints: Vec<HintSlotVm>,
    pub solution: ActionVm,
    pub review: ActionVm,
    pub notes: String,
    pub notes_label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelBody {
    /// Waiting for the stored record.
    Loading,
    SetupPrompt,
    Ready(PanelBodyVm),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelVm {
    pub title: String,
    pub platform: String,
    pub timer: String,
    pub paused: bool,
    pub collapsed: bool,
    pub body: PanelBody,
}

impl PanelVm {
    /// The panel as mounted, before the stored record arrives.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            title: LOADING_TEXT.to_string(),
            platform: String::new(),
            timer: format_elapsed(0),
            paused: false,
            collapsed: false,
            body: PanelBody::Loading,
        }
    }

    #[must_use]
    pub fn from_session(session: &PanelSession) -> Self {
        let body = if session.setup_required {
            PanelBody::SetupPrompt
        } else {
            PanelBody::Ready(body_vm(session))
        };
        Self {
            title: session.record.title.clone(),
            platform: session.record.platform.clone(),
            timer: format_elapsed(session.elapsed),
            paused: session.paused,
            collapsed: session.collapsed,
            body,
        }
    }

    /// `None` while no panel is mounted.
    #[must_use]
    pub fn from_controller(controller: &PanelController) -> Option<Self> {
        match controller.state() {
            PanelState::Initializing { .. } => Some(Self::loading()),
            PanelState::Active(session) => Some(Self::from_session(session)),
            _ => None,
        }
    }
}

fn body_vm(session: &PanelSession) -> PanelBodyVm {
    let hints = HintLevel::all()
        .map(|level| HintSlotVm {
            level: level.value(),
            label: format!("Get Hint {level}"),
            enabled: session.hint_enabled(level),
            region: session.hint_region(level).into(),
        })
        .collect();

    PanelBodyVm {
        hints,
        solution: ActionVm {
            enabled: session.solution_enabled(),
            region: (&session.solution_region).into(),
        },
        review: ActionVm {
            enabled: session.review_enabled(),
            region: (&session.review_region).into(),
        },
        notes: session.record.notes.clone().unwrap_or_default(),
        notes_label: if session.record.has_notes() {
            "Update Notes"
        } else {
            "Save Notes"
        },
    }
}
