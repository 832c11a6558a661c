use buddy_core::model::{HintLevel, PageLocation, ProblemRecord};
use url::Url;

use crate::panel::{PanelSession, PanelView, Region, SessionEpoch};
use crate::views::{HtmlPanelView, render_panel_markup};
use crate::vm::PanelVm;

fn session() -> PanelSession {
    let mut record = ProblemRecord {
        title: "1. Two Sum".into(),
        platform: "LeetCode".into(),
        time_spent: 95,
        ..ProblemRecord::default()
    };
    record.record_hint(HintLevel::FIRST, "Try a **hash map**.").unwrap();
    record.set_notes("remember complements");
    let location = PageLocation::new(Url::parse("https://leetcode.com/problems/two-sum/").unwrap());
    PanelSession::resume(SessionEpoch::FIRST, location, record)
}

#[test]
fn active_panel_renders_progress() {
    let html = render_panel_markup(&PanelVm::from_session(&session()));

    assert!(html.contains("1. Two Sum"), "missing title in {html}");
    assert!(html.contains("00:01:35"), "missing timer in {html}");
    assert!(html.contains("<strong>hash map</strong>"), "missing hint in {html}");
    assert!(html.contains("Get Hint 5"), "missing hint slots in {html}");
    assert!(html.contains("Update Notes"), "missing notes label in {html}");
    assert!(html.contains("remember complements"), "missing notes in {html}");
}

#[test]
fn loading_regions_show_progress_text() {
    let mut session = session();
    *session.hint_region_mut(HintLevel::new(2).unwrap()) = Region::Loading("Generating hint...");
    session.review_region = Region::Error("API request failed: quota".into());

    let html = render_panel_markup(&PanelVm::from_session(&session));
    assert!(html.contains("Generating hint..."), "missing loading text in {html}");
    assert!(html.contains("Error: API request failed: quota"), "missing error in {html}");
}

#[test]
fn setup_prompt_replaces_body() {
    let mut session = session();
    session.setup_required = true;

    let html = render_panel_markup(&PanelVm::from_session(&session));
    assert!(html.contains("Activate AI Features"), "missing prompt in {html}");
    assert!(!html.contains("Get Hint 1"), "body should be replaced in {html}");
}

#[test]
fn html_view_only_renders_while_mounted() {
    let mut view = HtmlPanelView::new();
    let handle = view.clone();

    view.render(&PanelVm::loading());
    assert_eq!(handle.html(), None);

    view.mount();
    view.render(&PanelVm::loading());
    assert!(handle.html().unwrap().contains("Loading..."));

    view.unmount();
    assert_eq!(handle.html(), None);
}
