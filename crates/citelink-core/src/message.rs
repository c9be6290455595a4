use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation, as delivered by the conversation store.
///
/// Messages are immutable once appended: the engine derives display blocks
/// and highlight state from them but never writes back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Pre-rendered markup from the answering service, if any. Must be
    /// sanitized before marker normalization and before display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_html: Option<String>,
    /// The citation registry: ordered, fixed at message creation. The
    /// citation at position `i` is addressed by marker numeral `i + 1`.
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

/// An inclusive page range within a source document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

/// One citation record attached to an assistant message.
///
/// Depending on the answering-service version the display fields arrive
/// either flat on the record or nested under a `document` sub-object; both
/// shapes deserialize here and [`crate::fields::resolve_display_fields`]
/// reconciles them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Citation {
    pub id: Option<String>,
    pub title: Option<String>,
    pub quote: Option<String>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub date: Option<String>,
    pub pages: Option<String>,
    pub page_span: Option<PageSpan>,
    /// 0..1, from the answer generator's citation validation.
    pub confidence_score: Option<f64>,
    pub hierarchy_path: Option<String>,
    pub link: Option<String>,
    /// Nested service shape: a partial copy of the same fields.
    pub document: Option<Box<Citation>>,
}
