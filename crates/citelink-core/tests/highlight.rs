use std::cell::RefCell;

use citelink_core::{
    ActivationSource, CLICK_HIGHLIGHT, Citation, Clipboard, ClipboardError, CrossRefController,
    DEEP_LINK_HIGHLIGHT, Effect, EventKind, HighlightState, TelemetryEvent, TelemetrySink,
    fragment_for, parse_fragment,
};

#[derive(Default)]
struct RecordingSink {
    events: RefCell<Vec<TelemetryEvent>>,
}

impl TelemetrySink for RecordingSink {
    fn track(&self, event: TelemetryEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn citation(title: &str) -> Citation {
    Citation {
        id: Some(format!("cit-{}", title)),
        title: Some(title.to_string()),
        quote: Some("quoted passage".to_string()),
        confidence_score: Some(0.9),
        ..Citation::default()
    }
}

fn registry(len: usize) -> Vec<Citation> {
    (0..len).map(|i| citation(&format!("Doc {}", i + 1))).collect()
}

fn schedule_token(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ScheduleClear { token, .. } => Some(*token),
            _ => None,
        })
        .expect("a clear was scheduled")
}

#[test]
fn click_highlights_and_rewrites_fragment() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(3));
    let effects = controller.activate(2, ActivationSource::MarkerClick, &sink);

    assert_eq!(controller.state(), HighlightState::Highlighted(1));
    assert!(effects.contains(&Effect::ScrollCitationIntoView { index: 1 }));
    assert!(effects.contains(&Effect::ReplaceFragment {
        fragment: "#cite-c2".to_string(),
    }));
    let token = schedule_token(&effects);

    controller.clear_elapsed(token);
    assert_eq!(controller.state(), HighlightState::Idle);
}

#[test]
fn out_of_range_activation_is_a_no_op() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(1));
    assert!(controller.activate(2, ActivationSource::MarkerClick, &sink).is_empty());
    assert!(controller.activate(0, ActivationSource::MarkerClick, &sink).is_empty());
    assert_eq!(controller.state(), HighlightState::Idle);
    assert!(sink.events.borrow().is_empty());
}

#[test]
fn new_activation_cancels_the_previous_timer() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(3));
    let first = controller.activate(1, ActivationSource::MarkerClick, &sink);
    let first_token = schedule_token(&first);

    let second = controller.activate(3, ActivationSource::MarkerClick, &sink);
    assert!(second.contains(&Effect::CancelClear { token: first_token }));
    assert_eq!(controller.state(), HighlightState::Highlighted(2));

    // The first timer fires late anyway: it must not clear the new highlight.
    controller.clear_elapsed(first_token);
    assert_eq!(controller.state(), HighlightState::Highlighted(2));

    controller.clear_elapsed(schedule_token(&second));
    assert_eq!(controller.state(), HighlightState::Idle);
}

#[test]
fn deep_link_uses_the_longer_duration() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(3));

    let click = controller.activate(1, ActivationSource::MarkerClick, &sink);
    let deep = controller.resolve_fragment("#cite-c3", &sink);

    let after_of = |effects: &[Effect]| {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::ScheduleClear { after, .. } => Some(*after),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(after_of(&click), CLICK_HIGHLIGHT);
    assert_eq!(after_of(&deep), DEEP_LINK_HIGHLIGHT);
    assert!(DEEP_LINK_HIGHLIGHT > CLICK_HIGHLIGHT);
}

#[test]
fn deep_link_resolution_matches_click_activation() {
    // Loading with #cite-c3 against 3 citations highlights
    // index 2 and scrolls it into view.
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(3));
    let effects = controller.resolve_fragment("#cite-c3", &sink);

    assert_eq!(controller.state(), HighlightState::Highlighted(2));
    assert!(effects.contains(&Effect::ScrollCitationIntoView { index: 2 }));

    let events = sink.events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::DeepLinkHighlight);
    assert_eq!(events[0].citation_index, 2);
    assert_eq!(events[0].document_title.as_deref(), Some("Doc 3"));
    assert_eq!(events[0].confidence, Some(0.9));
}

#[test]
fn click_emits_activation_event() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(2));
    controller.activate(1, ActivationSource::MarkerClick, &sink);

    let events = sink.events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::CitationActivated);
    assert_eq!(events[0].citation_id.as_deref(), Some("cit-Doc 1"));
    assert_eq!(events[0].citation_index, 0);
}

#[test]
fn unrecognized_fragments_are_ignored() {
    let sink = RecordingSink::default();
    let mut controller = CrossRefController::new(registry(3));
    for fragment in ["", "#", "#cite", "#cite-c", "#cite-c0", "#cite-c01", "#cite-cx", "#other"] {
        assert!(controller.resolve_fragment(fragment, &sink).is_empty(), "{}", fragment);
    }
    assert_eq!(controller.state(), HighlightState::Idle);
}

#[test]
fn fragment_codec_round_trips() {
    assert_eq!(fragment_for(2), "#cite-c2");
    assert_eq!(parse_fragment("#cite-c2"), Some(2));
    assert_eq!(parse_fragment("cite-c12"), Some(12));
    assert_eq!(parse_fragment(&fragment_for(7)), Some(7));
}

struct FakeClipboard {
    fail: bool,
    last: Option<String>,
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            Err(ClipboardError("denied".to_string()))
        } else {
            self.last = Some(text.to_string());
            Ok(())
        }
    }
}

#[test]
fn copy_citation_reports_success_and_failure() {
    let controller = CrossRefController::new(vec![Citation {
        title: Some("Annual Report".to_string()),
        category: Some("Reports".to_string()),
        pages: Some("12-14".to_string()),
        ..Citation::default()
    }]);

    let mut clipboard = FakeClipboard { fail: false, last: None };
    assert!(controller.copy_citation(0, &mut clipboard));
    assert_eq!(
        clipboard.last.as_deref(),
        Some("(Annual Report; Reports; p. 12-14)")
    );

    let mut failing = FakeClipboard { fail: true, last: None };
    assert!(!controller.copy_citation(0, &mut failing));
    assert!(!controller.copy_citation(5, &mut clipboard));
}
