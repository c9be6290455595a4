use chrono::NaiveDate;

use crate::message::Citation;

/// Placeholder title for citations that carry none, flat or nested.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Dates ending in this suffix mean "year-level precision only" and display
/// as the bare 4-digit year.
const YEAR_ONLY_SUFFIX: &str = "-01-01";

/// Display-ready fields for one citation, reconciled across the flat and
/// nested record shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayFields {
    pub title: String,
    pub category: Option<String>,
    pub section: Option<String>,
    pub date: Option<String>,
    pub pages: Option<String>,
    pub heading: Option<String>,
}

/// Resolves a citation record into display fields. Per field: the flat value
/// wins, then the nested document's value, then a placeholder (title only;
/// the other fields are simply omitted).
pub fn resolve_display_fields(citation: &Citation) -> DisplayFields {
    let nested = citation.document.as_deref();

    let title = field(&citation.title, nested, |c| &c.title)
        .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string());
    let pages = field(&citation.pages, nested, |c| &c.pages)
        .map(|raw| normalize_pages(&raw))
        .or_else(|| span_pages(citation));

    DisplayFields {
        title,
        category: field(&citation.category, nested, |c| &c.category),
        section: field(&citation.section, nested, |c| &c.section),
        date: field(&citation.date, nested, |c| &c.date).map(|raw| format_date(&raw)),
        pages,
        heading: field(&citation.hierarchy_path, nested, |c| &c.hierarchy_path),
    }
}

fn field(
    flat: &Option<String>,
    nested: Option<&Citation>,
    get: fn(&Citation) -> &Option<String>,
) -> Option<String> {
    flat.clone()
        .or_else(|| nested.and_then(|doc| get(doc).clone()))
}

fn span_pages(citation: &Citation) -> Option<String> {
    let span = citation
        .page_span
        .or_else(|| citation.document.as_ref().and_then(|doc| doc.page_span))?;
    if span.start == span.end {
        Some(format!("p. {}", span.start))
    } else {
        Some(format!("p. {}–{}", span.start, span.end))
    }
}

/// Prefixes `p. ` unless the string already starts with a case-insensitive
/// `p.`.
pub fn normalize_pages(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 && bytes[0].eq_ignore_ascii_case(&b'p') && bytes[1] == b'.' {
        trimmed.to_string()
    } else {
        format!("p. {}", trimmed)
    }
}

/// Renders a stored date string for display. Year-sentinel dates show just
/// the year; well-formed dates show a month/day/year string; anything else
/// falls back to the raw string unchanged. Never an "Invalid Date".
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with(YEAR_ONLY_SUFFIX) {
        let year = &trimmed[..trimmed.len() - YEAR_ONLY_SUFFIX.len()];
        if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
            return year.to_string();
        }
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Formats one citation for clipboard/export, in the answering service's
/// own shape: `(Title; Category; p.X–Y; Heading)`.
pub fn format_citation_text(fields: &DisplayFields) -> String {
    let mut parts = vec![fields.title.clone()];
    for part in [&fields.category, &fields.pages, &fields.heading] {
        if let Some(value) = part {
            parts.push(value.clone());
        }
    }
    format!("({})", parts.join("; "))
}
