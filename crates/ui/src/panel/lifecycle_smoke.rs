use buddy_core::model::{HintLevel, PageLocation, ProblemRecord, ScrapedProblem};
use buddy_core::time::fixed_clock;
use services::{AiReply, MISSING_CREDENTIAL_MESSAGE, PanelSignal, PromptIntent};
use url::Url;

use crate::panel::session::{EMPTY_REVIEW_NOTICE, HINT_LOADING};
use crate::panel::{
    AiTarget, PanelConfig, PanelController, PanelEffect, PanelEvent, PanelPhase, PageSnapshot,
    Region, SessionEpoch, UserAction, transition,
};

const TWO_SUM: &str = "https://leetcode.com/problems/two-sum/";
const THREE_SUM: &str = "https://leetcode.com/problems/3sum/";

fn page(url: &str) -> PageSnapshot {
    PageSnapshot {
        location: PageLocation::new(Url::parse(url).unwrap()),
        title_ready: true,
    }
}

fn scraped() -> ScrapedProblem {
    ScrapedProblem {
        title: "1. Two Sum".into(),
        description: "Given an array...".into(),
        platform: "LeetCode".into(),
    }
}

fn controller() -> PanelController {
    PanelController::new(&PanelConfig::default(), fixed_clock())
}

fn step(controller: PanelController, event: PanelEvent) -> (PanelController, Vec<PanelEffect>) {
    transition(controller, event)
}

fn load_epoch(effects: &[PanelEffect]) -> SessionEpoch {
    effects
        .iter()
        .find_map(|effect| match effect {
            PanelEffect::LoadRecord { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .expect("load effect")
}

fn persisted(effects: &[PanelEffect]) -> Vec<&ProblemRecord> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            PanelEffect::Persist { record, .. } => Some(record),
            _ => None,
        })
        .collect()
}

/// Brings a controller to `Active` on `url` with the given stored record.
fn active_on(url: &str, stored: Option<ProblemRecord>, has_credential: bool) -> PanelController {
    let (c, effects) = step(controller(), PanelEvent::Settled(page(url)));
    let epoch = load_epoch(&effects);
    let (c, _) = step(
        c,
        PanelEvent::RecordLoaded {
            epoch,
            scraped: scraped(),
            stored,
            has_credential,
        },
    );
    assert_eq!(c.phase(), PanelPhase::Active);
    c
}

fn epoch_of(c: &PanelController) -> SessionEpoch {
    c.session().unwrap().epoch
}

fn ticks(mut c: PanelController, n: u64) -> (PanelController, Vec<PanelEffect>) {
    let mut all = Vec::new();
    for _ in 0..n {
        let (next, effects) = step(c, PanelEvent::Tick);
        c = next;
        all.extend(effects);
    }
    (c, all)
}

#[test]
fn first_visit_persists_an_initial_record() {
    let (c, effects) = step(controller(), PanelEvent::Settled(page(TWO_SUM)));
    assert_eq!(c.phase(), PanelPhase::Initializing);
    assert_eq!(effects[0], PanelEffect::Mount);

    let (c, effects) = step(
        c,
        PanelEvent::RecordLoaded {
            epoch: load_epoch(&effects),
            scraped: scraped(),
            stored: None,
            has_credential: true,
        },
    );
    assert_eq!(c.phase(), PanelPhase::Active);
    let saved = persisted(&effects);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "1. Two Sum");
    assert_eq!(saved[0].url, TWO_SUM);
    assert!(saved[0].last_accessed.is_some());
    assert!(effects.contains(&PanelEffect::StartTimer));
}

#[test]
fn returning_visit_keeps_stored_progress_and_skips_initial_save() {
    let stored = ProblemRecord {
        title: "Old title".into(),
        time_spent: 300,
        hints_used: 2,
        hints: vec![Some("a".into()), Some("b".into())],
        ..ProblemRecord::default()
    };
    let (c, effects) = step(controller(), PanelEvent::Settled(page(TWO_SUM)));
    let (c, effects) = step(
        c,
        PanelEvent::RecordLoaded {
            epoch: load_epoch(&effects),
            scraped: scraped(),
            stored: Some(stored),
            has_credential: true,
        },
    );
    assert!(persisted(&effects).is_empty());

    let session = c.session().unwrap();
    assert_eq!(session.record.title, "1. Two Sum");
    assert_eq!(session.elapsed, 300);
    assert_eq!(session.hints_unlocked, 2);
    assert!(session.hint_enabled(HintLevel::new(3).unwrap()));
}

#[test]
fn waits_for_title_before_initializing() {
    let mut snapshot = page(TWO_SUM);
    snapshot.title_ready = false;
    let (c, effects) = step(controller(), PanelEvent::Settled(snapshot));
    assert_eq!(c.phase(), PanelPhase::Uninitialized);
    assert!(effects.is_empty());
}

#[test]
fn ticks_flush_every_thirty_seconds_and_pause_stops_counting() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, effects) = ticks(c, 29);
    assert!(persisted(&effects).is_empty());

    let (c, effects) = ticks(c, 1);
    let saved = persisted(&effects);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].time_spent, 30);

    let (c, _) = step(c, PanelEvent::User(UserAction::TogglePause));
    let (c, effects) = ticks(c, 45);
    assert_eq!(c.session().unwrap().elapsed, 30);
    assert!(persisted(&effects).is_empty());
}

#[test]
fn close_suppresses_reopen_until_path_changes() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, _) = ticks(c, 7);

    let (c, effects) = step(c, PanelEvent::User(UserAction::Close));
    assert_eq!(c.phase(), PanelPhase::ClosedByUser);
    assert_eq!(persisted(&effects)[0].time_spent, 7);
    assert!(effects.contains(&PanelEffect::StopTimer));
    assert!(effects.contains(&PanelEffect::Unmount));

    let (c, effects) = step(c, PanelEvent::Settled(page(TWO_SUM)));
    assert!(effects.is_empty());
    assert_eq!(c.phase(), PanelPhase::ClosedByUser);
    assert_eq!(c.memory().last_path.as_deref(), Some("/problems/two-sum/"));

    let (c, effects) = step(c, PanelEvent::Settled(page(THREE_SUM)));
    assert_eq!(c.phase(), PanelPhase::Initializing);
    assert!(!c.memory().closed_by_user);
    assert!(effects.contains(&PanelEffect::Mount));
}

#[test]
fn reopen_signal_overrides_close_on_same_path() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, _) = step(c, PanelEvent::User(UserAction::Close));

    let (c, effects) = step(
        c,
        PanelEvent::Signal(PanelSignal::TogglePanel, page(TWO_SUM)),
    );
    assert_eq!(c.phase(), PanelPhase::Initializing);
    assert!(effects.contains(&PanelEffect::Mount));
}

#[test]
fn key_update_tears_down_and_reinitializes() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), false);
    let old = epoch_of(&c);

    let (c, effects) = step(
        c,
        PanelEvent::Signal(PanelSignal::ApiKeyUpdated, page(TWO_SUM)),
    );
    assert_eq!(effects[0], PanelEffect::StopTimer);
    assert!(effects.contains(&PanelEffect::Unmount));
    assert!(load_epoch(&effects) > old);
    assert_eq!(c.phase(), PanelPhase::Initializing);
}

#[test]
fn leaving_problem_pages_tears_down() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, _) = ticks(c, 3);

    let (c, effects) = step(c, PanelEvent::Settled(page("https://leetcode.com/problemset/")));
    assert_eq!(c.phase(), PanelPhase::OffContext);
    assert_eq!(persisted(&effects)[0].time_spent, 3);
    assert_eq!(c.memory().last_path, None);

    let (c, _) = step(c, PanelEvent::Settled(page(TWO_SUM)));
    assert_eq!(c.phase(), PanelPhase::Initializing);
}

#[test]
fn navigation_reset_discards_replies_for_previous_problem() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let old = epoch_of(&c);
    let (c, effects) = step(c, PanelEvent::User(UserAction::RequestHint(1)));
    assert!(matches!(
        effects[0],
        PanelEffect::RequestAi {
            target: AiTarget::Hint(_),
            intent: PromptIntent::Hint(_),
            ..
        }
    ));

    let (c, effects) = step(c, PanelEvent::Settled(page(THREE_SUM)));
    let epoch = load_epoch(&effects);
    let (c, _) = step(
        c,
        PanelEvent::RecordLoaded {
            epoch,
            scraped: scraped(),
            stored: Some(ProblemRecord {
                time_spent: 12,
                ..ProblemRecord::default()
            }),
            has_credential: true,
        },
    );

    assert!(!c.is_current(old));
    let (c, effects) = step(
        c,
        PanelEvent::AiAnswered {
            epoch: old,
            target: AiTarget::Hint(HintLevel::FIRST),
            reply: AiReply::Text {
                text: "Try sorting.".into(),
            },
        },
    );
    assert!(effects.is_empty());
    let session = c.session().unwrap();
    assert_eq!(session.elapsed, 12);
    assert_eq!(session.hints_unlocked, 0);
    assert_eq!(session.hint_region(HintLevel::FIRST), &Region::Hidden);
}

#[test]
fn stale_record_load_is_ignored() {
    let (c, effects) = step(controller(), PanelEvent::Settled(page(TWO_SUM)));
    let first = load_epoch(&effects);
    let (c, _) = step(c, PanelEvent::User(UserAction::Refresh));

    let (c, effects) = step(
        c,
        PanelEvent::RecordLoaded {
            epoch: first,
            scraped: scraped(),
            stored: None,
            has_credential: true,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(c.phase(), PanelPhase::Initializing);
}

#[test]
fn hint_success_unlocks_next_level_and_persists() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let epoch = epoch_of(&c);

    let (c, _) = step(c, PanelEvent::User(UserAction::RequestHint(2)));
    assert_eq!(
        c.session().unwrap().hint_region(HintLevel::new(2).unwrap()),
        &Region::Hidden
    );

    let (c, _) = step(c, PanelEvent::User(UserAction::RequestHint(1)));
    assert_eq!(
        c.session().unwrap().hint_region(HintLevel::FIRST),
        &Region::Loading(HINT_LOADING)
    );
    // A second click while loading sends nothing.
    let (c, effects) = step(c, PanelEvent::User(UserAction::RequestHint(1)));
    assert!(effects.is_empty());

    let (c, effects) = step(
        c,
        PanelEvent::AiAnswered {
            epoch,
            target: AiTarget::Hint(HintLevel::FIRST),
            reply: AiReply::Text {
                text: "Try sorting.".into(),
            },
        },
    );
    let saved = persisted(&effects);
    assert_eq!(saved[0].hints_used, 1);
    assert_eq!(saved[0].hints, vec![Some("Try sorting.".to_string())]);

    let session = c.session().unwrap();
    assert!(session.hint_enabled(HintLevel::new(2).unwrap()));
}

#[test]
fn failed_hint_stays_disabled_but_solution_can_retry() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let epoch = epoch_of(&c);
    let (c, _) = step(c, PanelEvent::User(UserAction::RequestHint(1)));
    let (c, _) = step(c, PanelEvent::User(UserAction::RequestSolution));
    assert!(!c.session().unwrap().solution_enabled());

    let failure = || AiReply::Error {
        error: "API request failed: quota".into(),
    };
    let (c, _) = step(
        c,
        PanelEvent::AiAnswered {
            epoch,
            target: AiTarget::Hint(HintLevel::FIRST),
            reply: failure(),
        },
    );
    let (c, effects) = step(
        c,
        PanelEvent::AiAnswered {
            epoch,
            target: AiTarget::Solution,
            reply: failure(),
        },
    );
    assert!(persisted(&effects).is_empty());

    let session = c.session().unwrap();
    assert_eq!(
        session.hint_region(HintLevel::FIRST),
        &Region::Error("API request failed: quota".into())
    );
    assert!(!session.hint_enabled(HintLevel::FIRST));
    assert!(session.solution_enabled());
}

#[test]
fn missing_credential_reply_shows_setup_prompt() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let epoch = epoch_of(&c);
    let (c, _) = step(c, PanelEvent::User(UserAction::RequestSolution));
    let (c, _) = step(
        c,
        PanelEvent::AiAnswered {
            epoch,
            target: AiTarget::Solution,
            reply: AiReply::Error {
                error: MISSING_CREDENTIAL_MESSAGE.into(),
            },
        },
    );

    let session = c.session().unwrap();
    assert_eq!(session.solution_region, Region::SetupPrompt);
    assert!(!session.solution_enabled());
}

#[test]
fn no_credential_at_init_requires_setup() {
    let c = active_on(TWO_SUM, None, false);
    assert!(c.session().unwrap().setup_required);
}

#[test]
fn solution_is_granted_once() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let epoch = epoch_of(&c);
    let (c, _) = step(c, PanelEvent::User(UserAction::RequestSolution));
    let (c, effects) = step(
        c,
        PanelEvent::AiAnswered {
            epoch,
            target: AiTarget::Solution,
            reply: AiReply::Text {
                text: "```js\nreturn [];\n```".into(),
            },
        },
    );
    let saved = persisted(&effects);
    assert!(saved[0].solution_viewed);
    assert!(saved[0].solution.is_some());

    let (_, effects) = step(c, PanelEvent::User(UserAction::RequestSolution));
    assert!(effects.is_empty());
}

#[test]
fn empty_review_is_refused_locally() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, effects) = step(
        c,
        PanelEvent::User(UserAction::RequestReview {
            code: "   \n".into(),
        }),
    );
    assert_eq!(effects, vec![PanelEffect::Render]);
    assert_eq!(
        c.session().unwrap().review_region,
        Region::Notice(EMPTY_REVIEW_NOTICE)
    );

    let (c, effects) = step(
        c,
        PanelEvent::User(UserAction::RequestReview {
            code: "let x = 1;".into(),
        }),
    );
    assert!(matches!(effects[0], PanelEffect::RequestAi { .. }));
    assert!(!c.session().unwrap().review_enabled());
}

#[test]
fn saving_notes_persists_latest_time() {
    let c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let (c, _) = ticks(c, 12);
    let (_, effects) = step(
        c,
        PanelEvent::User(UserAction::SaveNotes {
            text: "two pointers".into(),
        }),
    );
    let saved = persisted(&effects);
    assert_eq!(saved[0].notes.as_deref(), Some("two pointers"));
    assert_eq!(saved[0].time_spent, 12);
}

#[test]
fn all_five_hints_unlock_in_order_and_nothing_follows() {
    let mut c = active_on(TWO_SUM, Some(ProblemRecord::default()), true);
    let epoch = epoch_of(&c);

    for level in HintLevel::all() {
        let (next, effects) = step(c, PanelEvent::User(UserAction::RequestHint(level.value())));
        assert!(
            matches!(effects[0], PanelEffect::RequestAi { .. }),
            "level {level} was not requested"
        );
        let (next, _) = step(
            next,
            PanelEvent::AiAnswered {
                epoch,
                target: AiTarget::Hint(level),
                reply: AiReply::Text {
                    text: format!("hint {level}"),
                },
            },
        );
        c = next;
        assert_eq!(c.session().unwrap().hints_unlocked, level.value());
    }

    let session = c.session().unwrap();
    assert_eq!(session.next_hint(), None);
    assert!(HintLevel::all().all(|level| !session.hint_enabled(level)));
    assert_eq!(session.record.hints_used, 5);

    for requested in [1, 5, 6] {
        let (next, effects) = step(c, PanelEvent::User(UserAction::RequestHint(requested)));
        assert!(effects.is_empty(), "level {requested} should be refused");
        c = next;
    }
    assert_eq!(c.session().unwrap().hints_unlocked, 5);
}
