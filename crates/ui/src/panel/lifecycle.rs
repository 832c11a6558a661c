//! Panel lifecycle as a pure state machine.
//!
//! `transition` takes the controller by value and an event, and returns the
//! next controller with the effects to run. Nothing here performs I/O: the
//! runtime interprets effects and feeds results back in as events.

use buddy_core::Clock;
use buddy_core::model::{HintLevel, PageLocation, ProblemId, ProblemRecord, ScrapedProblem};
use services::generation::PromptIntent;
use services::{AiReply, MISSING_CREDENTIAL_MESSAGE, PanelSignal};

use crate::panel::config::PanelConfig;
use crate::panel::navigation::{NavigationMemory, Verdict, assess};
use crate::panel::page::PageSnapshot;
use crate::panel::session::{
    AiTarget, EMPTY_REVIEW_NOTICE, HINT_LOADING, PanelSession, REVIEW_LOADING, Region,
    SOLUTION_LOADING, SessionEpoch,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    /// Panel mounted, waiting for the stored record.
    Initializing {
        epoch: SessionEpoch,
        location: PageLocation,
    },
    Active(Box<PanelSession>),
    ClosedByUser,
    OffContext,
}

/// `PanelState` without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Uninitialized,
    Initializing,
    Active,
    ClosedByUser,
    OffContext,
}

/// Something the user did inside the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    TogglePause,
    ToggleCollapse,
    Refresh,
    Close,
    RequestHint(u8),
    RequestSolution,
    RequestReview { code: String },
    SaveNotes { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Page mutations quiesced.
    Settled(PageSnapshot),
    /// Dashboard signal, with the page as it is right now.
    Signal(PanelSignal, PageSnapshot),
    User(UserAction),
    Tick,
    RecordLoaded {
        epoch: SessionEpoch,
        scraped: ScrapedProblem,
        stored: Option<ProblemRecord>,
        has_credential: bool,
    },
    AiAnswered {
        epoch: SessionEpoch,
        target: AiTarget,
        reply: AiReply,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEffect {
    Mount,
    Unmount,
    StartTimer,
    StopTimer,
    /// Scrape the page and fetch the stored record and credential status.
    LoadRecord {
        epoch: SessionEpoch,
        location: PageLocation,
    },
    /// Write the full record. Persists must run in emission order.
    Persist {
        problem_id: ProblemId,
        record: ProblemRecord,
    },
    RequestAi {
        epoch: SessionEpoch,
        target: AiTarget,
        intent: PromptIntent,
        problem: ProblemRecord,
    },
    Render,
}

#[derive(Debug, Clone)]
pub struct PanelController {
    state: PanelState,
    memory: NavigationMemory,
    next_epoch: SessionEpoch,
    clock: Clock,
    flush_every: u64,
}

impl PanelController {
    #[must_use]
    pub fn new(config: &PanelConfig, clock: Clock) -> Self {
        Self {
            state: PanelState::Uninitialized,
            memory: NavigationMemory::default(),
            next_epoch: SessionEpoch::FIRST,
            clock,
            flush_every: config.flush_every.max(1),
        }
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> PanelPhase {
        match self.state {
            PanelState::Uninitialized => PanelPhase::Uninitialized,
            PanelState::Initializing { .. } => PanelPhase::Initializing,
            PanelState::Active(_) => PanelPhase::Active,
            PanelState::ClosedByUser => PanelPhase::ClosedByUser,
            PanelState::OffContext => PanelPhase::OffContext,
        }
    }

    #[must_use]
    pub fn memory(&self) -> &NavigationMemory {
        &self.memory
    }

    #[must_use]
    pub fn session(&self) -> Option<&PanelSession> {
        match &self.state {
            PanelState::Active(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn panel_present(&self) -> bool {
        matches!(
            self.state,
            PanelState::Initializing { .. } | PanelState::Active(_)
        )
    }

    /// Whether a reply tagged with `epoch` still has a live owner.
    #[must_use]
    pub fn is_current(&self, epoch: SessionEpoch) -> bool {
        match &self.state {
            PanelState::Initializing { epoch: live, .. } => *live == epoch,
            PanelState::Active(session) => session.epoch == epoch,
            _ => false,
        }
    }

    fn apply(&mut self, event: PanelEvent, fx: &mut Vec<PanelEffect>) {
        match event {
            PanelEvent::Settled(page) => self.check(&page, fx),
            PanelEvent::Signal(_, page) => {
                self.memory.closed_by_user = false;
                if self.panel_present() {
                    self.teardown(fx);
                }
                self.check(&page, fx);
            }
            PanelEvent::User(action) => self.user(action, fx),
            PanelEvent::Tick => self.tick(fx),
            PanelEvent::RecordLoaded {
                epoch,
                scraped,
                stored,
                has_credential,
            } => self.activate(epoch, &scraped, stored, has_credential, fx),
            PanelEvent::AiAnswered {
                epoch,
                target,
                reply,
            } => self.answer(epoch, target, reply, fx),
        }
    }

    fn check(&mut self, page: &PageSnapshot, fx: &mut Vec<PanelEffect>) {
        match assess(page, &self.memory, self.panel_present()) {
            Verdict::OffContext => {
                if self.panel_present() {
                    self.teardown(fx);
                }
                self.state = PanelState::OffContext;
                self.memory.last_path = None;
            }
            Verdict::Suppressed | Verdict::NotReady | Verdict::Unchanged => {}
            Verdict::Initialize => {
                self.remember(page);
                self.initialize(page.location.clone(), fx);
            }
            Verdict::Reset => {
                self.teardown(fx);
                self.remember(page);
                self.initialize(page.location.clone(), fx);
            }
        }
    }

    fn remember(&mut self, page: &PageSnapshot) {
        if !self.memory.is_same_path(page) {
            self.memory.closed_by_user = false;
        }
        self.memory.last_path = Some(page.location.path().to_string());
    }

    fn initialize(&mut self, location: PageLocation, fx: &mut Vec<PanelEffect>) {
        let epoch = self.next_epoch;
        self.next_epoch = epoch.next();
        self.state = PanelState::Initializing {
            epoch,
            location: location.clone(),
        };
        fx.push(PanelEffect::Mount);
        fx.push(PanelEffect::LoadRecord { epoch, location });
        fx.push(PanelEffect::Render);
    }

    /// Removes the panel. An active session flushes time not yet written.
    fn teardown(&mut self, fx: &mut Vec<PanelEffect>) {
        match std::mem::replace(&mut self.state, PanelState::Uninitialized) {
            PanelState::Active(mut session) => {
                if session.has_unsaved_time() {
                    let record = session.snapshot(self.clock.now());
                    fx.push(PanelEffect::Persist {
                        problem_id: session.problem_id.clone(),
                        record,
                    });
                }
                fx.push(PanelEffect::StopTimer);
                fx.push(PanelEffect::Unmount);
            }
            PanelState::Initializing { .. } => fx.push(PanelEffect::Unmount),
            other => self.state = other,
        }
    }

    fn activate(
        &mut self,
        epoch: SessionEpoch,
        scraped: &ScrapedProblem,
        stored: Option<ProblemRecord>,
        has_credential: bool,
        fx: &mut Vec<PanelEffect>,
    ) {
        let PanelState::Initializing {
            epoch: live,
            location,
        } = &self.state
        else {
            return;
        };
        if *live != epoch {
            return;
        }
        let location = location.clone();

        let is_new = stored.is_none();
        let problem_id = location.problem_id();
        let record = ProblemRecord::merge_scraped(stored, scraped, problem_id.as_str());
        let mut session = PanelSession::resume(epoch, location, record);
        session.setup_required = !has_credential;
        if is_new {
            let record = session.snapshot(self.clock.now());
            fx.push(PanelEffect::Persist { problem_id, record });
        }

        self.state = PanelState::Active(Box::new(session));
        fx.push(PanelEffect::StartTimer);
        fx.push(PanelEffect::Render);
    }

    fn tick(&mut self, fx: &mut Vec<PanelEffect>) {
        let now = self.clock.now();
        let flush_every = self.flush_every;
        let PanelState::Active(session) = &mut self.state else {
            return;
        };
        if session.paused {
            return;
        }
        session.elapsed += 1;
        if session.elapsed % flush_every == 0 {
            let record = session.snapshot(now);
            fx.push(PanelEffect::Persist {
                problem_id: session.problem_id.clone(),
                record,
            });
        }
        fx.push(PanelEffect::Render);
    }

    fn user(&mut self, action: UserAction, fx: &mut Vec<PanelEffect>) {
        match action {
            UserAction::Close => {
                if self.panel_present() {
                    self.memory.closed_by_user = true;
                    self.teardown(fx);
                    self.state = PanelState::ClosedByUser;
                }
            }
            UserAction::Refresh => {
                let location = match &self.state {
                    PanelState::Initializing { location, .. } => location.clone(),
                    PanelState::Active(session) => session.location.clone(),
                    _ => return,
                };
                self.teardown(fx);
                self.initialize(location, fx);
            }
            action => {
                let now = self.clock.now();
                if let PanelState::Active(session) = &mut self.state {
                    session_action(session, action, now, fx);
                }
            }
        }
    }

    fn answer(&mut self, epoch: SessionEpoch, target: AiTarget, reply: AiReply, fx: &mut Vec<PanelEffect>) {
        let now = self.clock.now();
        let PanelState::Active(session) = &mut self.state else {
            return;
        };
        if session.epoch != epoch {
            return;
        }

        match reply {
            AiReply::Text { text } => match target {
                AiTarget::Hint(level) => match session.record.record_hint(level, text.clone()) {
                    Ok(()) => {
                        session.hints_unlocked = session.record.hints_used;
                        *session.hint_region_mut(level) = Region::Text(text);
                        persist(session, now, fx);
                    }
                    Err(err) => *session.hint_region_mut(level) = Region::Error(err.to_string()),
                },
                AiTarget::Solution => match session.record.record_solution(text) {
                    Ok(()) => {
                        session.solution_visible = true;
                        session.solution_region =
                            Region::Text(session.record.solution.clone().unwrap_or_default());
                        persist(session, now, fx);
                    }
                    Err(err) => session.solution_region = Region::Error(err.to_string()),
                },
                AiTarget::Review => session.review_region = Region::Text(text),
            },
            AiReply::Error { error } => {
                let region = if is_missing_credential(&error) {
                    Region::SetupPrompt
                } else {
                    Region::Error(error)
                };
                *target_region(session, target) = region;
            }
        }
        fx.push(PanelEffect::Render);
    }
}

/// Runs one event through the controller.
#[must_use]
pub fn transition(mut controller: PanelController, event: PanelEvent) -> (PanelController, Vec<PanelEffect>) {
    let mut effects = Vec::new();
    controller.apply(event, &mut effects);
    (controller, effects)
}

#[must_use]
pub fn is_missing_credential(error: &str) -> bool {
    error.contains(MISSING_CREDENTIAL_MESSAGE)
}

fn target_region(session: &mut PanelSession, target: AiTarget) -> &mut Region {
    match target {
        AiTarget::Hint(level) => session.hint_region_mut(level),
        AiTarget::Solution => &mut session.solution_region,
        AiTarget::Review => &mut session.review_region,
    }
}

fn persist(session: &mut PanelSession, now: chrono::DateTime<chrono::Utc>, fx: &mut Vec<PanelEffect>) {
    let record = session.snapshot(now);
    fx.push(PanelEffect::Persist {
        problem_id: session.problem_id.clone(),
        record,
    });
}

fn request(session: &mut PanelSession, target: AiTarget, intent: PromptIntent, loading: &'static str, fx: &mut Vec<PanelEffect>) {
    *target_region(session, target) = Region::Loading(loading);
    fx.push(PanelEffect::RequestAi {
        epoch: session.epoch,
        target,
        intent,
        problem: session.record.clone(),
    });
    fx.push(PanelEffect::Render);
}

fn session_action(
    session: &mut PanelSession,
    action: UserAction,
    now: chrono::DateTime<chrono::Utc>,
    fx: &mut Vec<PanelEffect>,
) {
    match action {
        UserAction::TogglePause => {
            session.paused = !session.paused;
            fx.push(PanelEffect::Render);
        }
        UserAction::ToggleCollapse => {
            session.collapsed = !session.collapsed;
            fx.push(PanelEffect::Render);
        }
        UserAction::RequestHint(level) => {
            let Ok(level) = HintLevel::new(level) else {
                return;
            };
            if session.hint_enabled(level) {
                request(session, AiTarget::Hint(level), PromptIntent::Hint(level), HINT_LOADING, fx);
            }
        }
        UserAction::RequestSolution => {
            if session.solution_enabled() {
                request(session, AiTarget::Solution, PromptIntent::Solution, SOLUTION_LOADING, fx);
            }
        }
        UserAction::RequestReview { code } => {
            if !session.review_enabled() {
                return;
            }
            if code.trim().is_empty() {
                session.review_region = Region::Notice(EMPTY_REVIEW_NOTICE);
                fx.push(PanelEffect::Render);
                return;
            }
            request(session, AiTarget::Review, PromptIntent::Review { code }, REVIEW_LOADING, fx);
        }
        UserAction::SaveNotes { text } => {
            session.record.set_notes(text);
            persist(session, now, fx);
            fx.push(PanelEffect::Render);
        }
        // Handled by the controller.
        UserAction::Close | UserAction::Refresh => {}
    }
}
