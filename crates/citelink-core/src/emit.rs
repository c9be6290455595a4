use std::collections::{HashMap, HashSet};

use ammonia::Builder;

use crate::block::AnswerBlock;
use crate::marker::{normalize_rendered_html, push_annotated_text};
use crate::message::ChatMessage;
use crate::parser::parse_blocks_cached;

/// Emits HTML for a parsed answer, with `[n]` occurrences replaced by
/// citation marker elements sized against a registry of `citation_count`
/// entries.
pub fn emit_answer_html(blocks: &[AnswerBlock], citation_count: usize) -> String {
    // Deterministic formatting: 2-space indentation and LF newlines.
    let mut writer = HtmlWriter::new();
    for block in blocks {
        emit_block(&mut writer, block, citation_count);
    }
    writer.finish()
}

/// Restricts markup to the display allow-list: paragraph, heading, list,
/// quote, inline-emphasis, anchor and code tags, plus the attributes the
/// citation markers carry. Anything else is dropped silently; this is a
/// trust boundary, not a validation-error path.
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a",
        "blockquote",
        "br",
        "code",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "i",
        "li",
        "ol",
        "p",
        "pre",
        "span",
        "strong",
        "ul",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");
    generic_attributes.insert("id");

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "target", "rel"].iter().copied().collect());
    tag_attributes.insert("ol", ["start", "type"].iter().copied().collect());
    // Citation marker attributes.
    tag_attributes.insert(
        "span",
        ["role", "tabindex", "aria-label"].iter().copied().collect(),
    );

    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");

    Builder::new()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .link_rel(None)
        .clean(html)
        .to_string()
}

/// The front door for one message: pre-rendered markup is sanitized and then
/// marker-normalized; otherwise the raw content is parsed into blocks and
/// emitted with markers, then sanitized.
pub fn render_message_html(message: &ChatMessage) -> String {
    let citation_count = message.citations.len();
    match &message.rendered_html {
        Some(html) => normalize_rendered_html(&sanitize_html(html), citation_count),
        None => {
            let blocks = parse_blocks_cached(&message.content);
            sanitize_html(&emit_answer_html(&blocks, citation_count))
        }
    }
}

struct HtmlWriter {
    out: String,
    indent: usize,
}

impl HtmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

fn emit_block(writer: &mut HtmlWriter, block: &AnswerBlock, citation_count: usize) {
    match block {
        AnswerBlock::Paragraph { text } => {
            let mut line = String::from("<p>");
            push_annotated_text(&mut line, text, citation_count);
            line.push_str("</p>");
            writer.line(&line);
        }
        AnswerBlock::UnorderedList { items } => {
            writer.line("<ul>");
            writer.indent += 1;
            emit_items(writer, items, citation_count);
            writer.indent -= 1;
            writer.line("</ul>");
        }
        AnswerBlock::OrderedList {
            items,
            start,
            style,
        } => {
            let mut open = String::from("<ol");
            if *start != 1 {
                open.push_str(&format!(" start=\"{}\"", start));
            }
            if let Some(type_attr) = style.type_attr() {
                open.push_str(&format!(" type=\"{}\"", type_attr));
            }
            open.push('>');
            writer.line(&open);
            writer.indent += 1;
            emit_items(writer, items, citation_count);
            writer.indent -= 1;
            writer.line("</ol>");
        }
    }
}

fn emit_items(writer: &mut HtmlWriter, items: &[String], citation_count: usize) {
    for item in items {
        let mut line = String::from("<li>");
        push_annotated_text(&mut line, item, citation_count);
        line.push_str("</li>");
        writer.line(&line);
    }
}

/// Writes one marker element. Validity is decided here, at normalization
/// time: out-of-range numerals get an inert broken-marker element with no
/// click affordance.
pub(crate) fn push_marker(out: &mut String, numeral: u32, citation_count: usize) {
    let in_range = numeral >= 1 && (numeral as usize) <= citation_count;
    if in_range {
        out.push_str(&format!(
            "<span class=\"citelink-marker\" role=\"button\" tabindex=\"0\" \
             data-citation-number=\"{n}\" aria-label=\"Citation {n}\">[{n}]</span>",
            n = numeral
        ));
    } else {
        out.push_str(&format!(
            "<span class=\"citelink-marker citelink-marker--broken\" \
             data-citation-number=\"{n}\" aria-label=\"Citation {n} (unavailable)\">[{n}]</span>",
            n = numeral
        ));
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
