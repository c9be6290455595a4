use std::time::Duration;

use chrono::Utc;

use crate::fields::{format_citation_text, resolve_display_fields};
use crate::message::Citation;
use crate::telemetry::{EventKind, TelemetryEvent, TelemetrySink};

/// Un-highlight delay after a direct marker click.
pub const CLICK_HIGHLIGHT: Duration = Duration::from_millis(3_000);
/// Un-highlight delay after deep-link resolution. Longer than a click, so a
/// reader arriving via URL has time to locate the cited passage.
pub const DEEP_LINK_HIGHLIGHT: Duration = Duration::from_millis(8_000);

/// Transient highlight state for one rendered message. At most one citation
/// index is highlighted at a time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HighlightState {
    Idle,
    Highlighted(usize),
}

/// Which path requested the highlight.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActivationSource {
    MarkerClick,
    DeepLink,
}

/// Side effects the host must carry out after a transition. The controller
/// itself stays pure so the state machine behaves identically under any UI
/// toolkit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Smooth, centered scroll of the citation element into view.
    /// Fire-and-forget; completion is never awaited.
    ScrollCitationIntoView { index: usize },
    /// Rewrite the address fragment in place, as a history edit that must
    /// not reload or re-navigate the page.
    ReplaceFragment { fragment: String },
    /// Schedule the cancellable un-highlight task. The token identifies this
    /// activation; hand it back via [`CrossRefController::clear_elapsed`].
    ScheduleClear { token: u64, after: Duration },
    /// Cancel a previously scheduled un-highlight task.
    CancelClear { token: u64 },
}

/// Host clipboard collaborator for best-effort citation copy.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClipboardError(pub String);

/// Owns the highlight state machine for one message's citation registry and
/// wires marker activation and deep links to it.
pub struct CrossRefController {
    citations: Vec<Citation>,
    state: HighlightState,
    // Instance-scoped activation sequence. A stale clear timer carries an
    // old token and is ignored, so it can never clear a newer highlight.
    generation: u64,
    pending_clear: Option<u64>,
}

impl CrossRefController {
    /// The registry is fixed at message creation and never reordered, so a
    /// clone is a faithful view.
    pub fn new(citations: Vec<Citation>) -> Self {
        Self {
            citations,
            state: HighlightState::Idle,
            generation: 0,
            pending_clear: None,
        }
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    /// Activates the citation addressed by a marker numeral (1-based).
    ///
    /// Out-of-range numerals change nothing: the marker was already rendered
    /// as broken at normalization time and stays visually inert. In range,
    /// any pending un-highlight is cancelled before the new one is
    /// scheduled, the deep-link fragment is rewritten, and an activation
    /// event is emitted.
    pub fn activate(
        &mut self,
        numeral: u32,
        source: ActivationSource,
        telemetry: &dyn TelemetrySink,
    ) -> Vec<Effect> {
        let Some(index) = (numeral as usize).checked_sub(1) else {
            return Vec::new();
        };
        let Some(citation) = self.citations.get(index) else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        if let Some(stale) = self.pending_clear.take() {
            effects.push(Effect::CancelClear { token: stale });
        }

        self.state = HighlightState::Highlighted(index);
        self.generation += 1;
        let token = self.generation;
        self.pending_clear = Some(token);

        let after = match source {
            ActivationSource::MarkerClick => CLICK_HIGHLIGHT,
            ActivationSource::DeepLink => DEEP_LINK_HIGHLIGHT,
        };
        effects.push(Effect::ScrollCitationIntoView { index });
        effects.push(Effect::ReplaceFragment {
            fragment: fragment_for(numeral),
        });
        effects.push(Effect::ScheduleClear { token, after });

        let fields = resolve_display_fields(citation);
        telemetry.track(TelemetryEvent {
            kind: match source {
                ActivationSource::MarkerClick => EventKind::CitationActivated,
                ActivationSource::DeepLink => EventKind::DeepLinkHighlight,
            },
            citation_id: citation.id.clone(),
            citation_index: index,
            document_title: Some(fields.title),
            confidence: citation.confidence_score,
            timestamp: Utc::now(),
        });

        effects
    }

    /// Runs the identical activation logic for an address fragment seen on
    /// load or on fragment change. Unrecognized fragment shapes are ignored.
    pub fn resolve_fragment(
        &mut self,
        fragment: &str,
        telemetry: &dyn TelemetrySink,
    ) -> Vec<Effect> {
        match parse_fragment(fragment) {
            Some(numeral) => self.activate(numeral, ActivationSource::DeepLink, telemetry),
            None => Vec::new(),
        }
    }

    /// The un-highlight task fired. Clears the highlight only if the token
    /// still belongs to the current activation.
    pub fn clear_elapsed(&mut self, token: u64) {
        if self.pending_clear == Some(token) {
            self.pending_clear = None;
            self.state = HighlightState::Idle;
        }
    }

    /// Best-effort clipboard copy of the formatted citation text. Failures
    /// are logged and swallowed; the caller only sees a bool.
    pub fn copy_citation(&self, index: usize, clipboard: &mut dyn Clipboard) -> bool {
        let Some(citation) = self.citations.get(index) else {
            return false;
        };
        let text = format_citation_text(&resolve_display_fields(citation));
        match clipboard.write_text(&text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(index, error = %err.0, "citation copy failed");
                false
            }
        }
    }
}

/// Deep-link fragment for a 1-based citation numeral.
pub fn fragment_for(numeral: u32) -> String {
    format!("#cite-c{}", numeral)
}

/// Parses a deep-link fragment of the shape `#cite-c<N>`, with N a decimal
/// integer, no leading zeros, 1-based. The leading `#` is optional because
/// hosts disagree on whether it belongs to the fragment string. Anything
/// else yields `None`.
pub fn parse_fragment(fragment: &str) -> Option<u32> {
    let rest = fragment.strip_prefix('#').unwrap_or(fragment);
    let digits = rest.strip_prefix("cite-c")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.starts_with('0') {
        return None;
    }
    digits.parse().ok().filter(|n| *n >= 1)
}
