use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a highlight came to be activated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A citation marker was clicked (or keyboard-activated).
    CitationActivated,
    /// A citation was highlighted by resolving a deep-link fragment.
    DeepLinkHighlight,
}

/// One fire-and-forget tracking call. The engine only emits these; delivery,
/// batching and transport belong to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_id: Option<String>,
    pub citation_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Telemetry collaborator. Implementations must swallow their own failures;
/// nothing in the engine depends on delivery or a return value.
pub trait TelemetrySink {
    fn track(&self, event: TelemetryEvent);
}

/// Sink that drops every event. Useful as a default and in tests.
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn track(&self, _event: TelemetryEvent) {}
}
