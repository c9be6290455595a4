use crate::emit::{escape_html, push_marker};

/// A `[n]` citation marker located in a text run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct MarkerMatch {
    start: usize,
    end: usize,
    numeral: u32,
}

fn next_marker(text: &str, from: usize) -> Option<MarkerMatch> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 && bytes.get(i + 1 + digits) == Some(&b']') {
            // Numerals too large for u32 stay literal text.
            if let Ok(numeral) = text[i + 1..i + 1 + digits].parse::<u32>() {
                return Some(MarkerMatch {
                    start: i,
                    end: i + digits + 2,
                    numeral,
                });
            }
        }
        i += 1;
    }
    None
}

/// Text mode: escapes `text` into `out`, replacing every `[n]` with an
/// interactive marker element (or a broken-marker element when `n` is out
/// of range for a registry of `citation_count` entries).
pub(crate) fn push_annotated_text(out: &mut String, text: &str, citation_count: usize) {
    let mut last = 0;
    while let Some(m) = next_marker(text, last) {
        out.push_str(&escape_html(&text[last..m.start]));
        push_marker(out, m.numeral, citation_count);
        last = m.end;
    }
    out.push_str(&escape_html(&text[last..]));
}

/// Rendered-markup mode: rewrites `[n]` occurrences inside an
/// already-sanitized HTML string into marker elements.
///
/// Only text outside tags is rewritten, and text inside an existing marker
/// element is left alone, so running this twice never double-wraps a marker.
pub fn normalize_rendered_html(html: &str, citation_count: usize) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut marker_depth = 0usize;
    let mut i = 0;
    while i < html.len() {
        if html.as_bytes()[i] == b'<' {
            let end = match tag_end(html, i) {
                Some(end) => end,
                // Unterminated tag: keep the rest verbatim.
                None => {
                    out.push_str(&html[i..]);
                    break;
                }
            };
            let tag = &html[i..end];
            if marker_depth > 0 {
                if is_open_span(tag) {
                    marker_depth += 1;
                } else if is_close_span(tag) {
                    marker_depth -= 1;
                }
            } else if is_open_span(tag) && tag.contains("data-citation-number") {
                marker_depth = 1;
            }
            out.push_str(tag);
            i = end;
            continue;
        }
        let next_tag = html[i..].find('<').map_or(html.len(), |pos| i + pos);
        let text = &html[i..next_tag];
        if marker_depth > 0 {
            out.push_str(text);
        } else {
            rewrite_text(&mut out, text, citation_count);
        }
        i = next_tag;
    }
    out
}

/// Like [`push_annotated_text`] but without re-escaping: the surrounding
/// text is already HTML.
fn rewrite_text(out: &mut String, text: &str, citation_count: usize) {
    let mut last = 0;
    while let Some(m) = next_marker(text, last) {
        out.push_str(&text[last..m.start]);
        push_marker(out, m.numeral, citation_count);
        last = m.end;
    }
    out.push_str(&text[last..]);
}

/// Index one past the closing `>`, honoring quoted attribute values.
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut quote: Option<u8> = None;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match quote {
            Some(q) => {
                if byte == q {
                    quote = None;
                }
            }
            None => match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'>' => return Some(start + offset + 1),
                _ => {}
            },
        }
    }
    None
}

fn is_open_span(tag: &str) -> bool {
    tag.strip_prefix("<span")
        .is_some_and(|rest| rest.starts_with([' ', '\t', '>', '/']))
}

fn is_close_span(tag: &str) -> bool {
    tag.starts_with("</span")
}
