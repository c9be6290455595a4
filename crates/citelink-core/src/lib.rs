mod block;
mod emit;
mod fields;
mod highlight;
mod marker;
mod message;
mod parser;
mod telemetry;

pub use block::{AnswerBlock, ListStyle};
pub use emit::{emit_answer_html, render_message_html, sanitize_html};
pub use fields::{
    DisplayFields, UNTITLED_DOCUMENT, format_citation_text, format_date, normalize_pages,
    resolve_display_fields,
};
pub use highlight::{
    ActivationSource, CLICK_HIGHLIGHT, Clipboard, ClipboardError, CrossRefController,
    DEEP_LINK_HIGHLIGHT, Effect, HighlightState, fragment_for, parse_fragment,
};
pub use marker::normalize_rendered_html;
pub use message::{ChatMessage, Citation, PageSpan, Role};
pub use parser::{parse_blocks, parse_blocks_cached};
pub use telemetry::{EventKind, NoopSink, TelemetryEvent, TelemetrySink};
