use std::sync::Mutex;

use lru::LruCache;
use once_cell::sync::Lazy;

use crate::block::{AnswerBlock, ListStyle};

/// Converts raw assistant text into an ordered sequence of display blocks.
///
/// This never fails: input that matches no recognized list shape degrades to
/// a single paragraph carrying the original text, and empty or
/// whitespace-only input yields an empty sequence. The function is pure, so
/// results may be memoized by content string (see [`parse_blocks_cached`]).
pub fn parse_blocks(content: &str) -> Vec<AnswerBlock> {
    let normalized = normalize_newlines(content);
    let recovered = recover_inline_lists(&normalized);

    let mut blocks = Vec::new();
    for chunk in chunks(&recovered) {
        decide_chunk(&chunk, &mut blocks);
    }
    blocks
}

type Cache = Mutex<LruCache<String, Vec<AnswerBlock>>>;

static PARSE_CACHE: Lazy<Cache> = Lazy::new(|| Mutex::new(LruCache::new(100.try_into().unwrap())));

/// [`parse_blocks`] behind a process-wide LRU keyed by the content string.
///
/// Messages are immutable once created, so a cache hit can never be stale.
pub fn parse_blocks_cached(content: &str) -> Vec<AnswerBlock> {
    if let Some(cached) = PARSE_CACHE.lock().unwrap().get(content) {
        return cached.clone();
    }
    let blocks = parse_blocks(content);
    PARSE_CACHE
        .lock()
        .unwrap()
        .put(content.to_string(), blocks.clone());
    blocks
}

fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Inserts a forced line break before an alphabetic or numeric list marker
/// that immediately follows a colon or semicolon. Answers often arrive with
/// list structure inlined in prose ("Causes: a) ... b) ..."); breaking the
/// line here lets the chunk classifier see the first item.
fn recover_inline_lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let ch_len = ch.len_utf8();
        out.push(ch);
        rest = &rest[ch_len..];
        if ch != ':' && ch != ';' {
            continue;
        }
        let skipped = rest.trim_start_matches([' ', '\t']);
        if starts_with_list_marker(skipped) {
            out.push('\n');
            rest = skipped;
        }
    }
    out
}

fn starts_with_list_marker(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b')' {
        return bytes[2] == b' ' || bytes[2] == b'\t';
    }
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    matches!(bytes.get(digits), Some(b'.') | Some(b')'))
        && matches!(bytes.get(digits + 1), Some(b' ') | Some(b'\t'))
}

/// Splits on blank-line runs, keeping only chunks with visible text. Lines
/// inside a chunk come out trimmed and non-empty.
fn chunks(text: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LineKind {
    Bullet,
    Numeric,
    Alpha,
    Plain,
}

fn classify(line: &str) -> LineKind {
    let bytes = line.as_bytes();
    if (line.starts_with('-') || line.starts_with('*') || line.starts_with('•'))
        && line[first_char_len(line)..].starts_with([' ', '\t'])
    {
        return LineKind::Bullet;
    }
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b')' {
        let rest = line[2..].trim_start();
        if !rest.is_empty() && line[2..].len() != rest.len() {
            return LineKind::Alpha;
        }
    }
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && matches!(bytes.get(digits), Some(b'.') | Some(b')')) {
        let rest = line[digits + 1..].trim_start();
        if !rest.is_empty() && line[digits + 1..].len() != rest.len() {
            return LineKind::Numeric;
        }
    }
    LineKind::Plain
}

fn first_char_len(line: &str) -> usize {
    line.chars().next().map(|ch| ch.len_utf8()).unwrap_or(0)
}

/// Strips the list marker prefix and a single trailing `;`, `:` or `,`.
fn strip_item(kind: LineKind, line: &str) -> String {
    let rest = match kind {
        LineKind::Bullet => &line[first_char_len(line)..],
        LineKind::Alpha => &line[2..],
        LineKind::Numeric => {
            let digits = line
                .bytes()
                .take_while(|b| b.is_ascii_digit())
                .count();
            &line[digits + 1..]
        }
        LineKind::Plain => line,
    };
    let mut item = rest.trim().to_string();
    if item.ends_with([';', ':', ',']) {
        item.pop();
        item.truncate(item.trim_end().len());
    }
    item
}

fn decide_chunk(lines: &[&str], blocks: &mut Vec<AnswerBlock>) {
    let kinds: Vec<LineKind> = lines.iter().map(|line| classify(line)).collect();

    if let Some(block) = build_homogeneous(lines, &kinds) {
        blocks.push(block);
        return;
    }

    // A plain lead-in line followed by a homogeneous list becomes a
    // paragraph and the corresponding list block.
    if kinds.len() > 1 && kinds[0] == LineKind::Plain {
        let rest_kinds = &kinds[1..];
        let rest_lines = &lines[1..];
        if rest_kinds[0] != LineKind::Plain
            && rest_kinds.iter().all(|kind| *kind == rest_kinds[0])
        {
            blocks.push(AnswerBlock::Paragraph {
                text: lines[0].to_string(),
            });
            if let Some(block) = build_homogeneous(rest_lines, rest_kinds) {
                blocks.push(block);
            }
            return;
        }
    }

    // No homogeneous classification: the whole chunk merges into one
    // paragraph. Keep this conservative; list detection must not get
    // more eager here.
    blocks.push(AnswerBlock::Paragraph {
        text: lines.join(" "),
    });
}

fn build_homogeneous(lines: &[&str], kinds: &[LineKind]) -> Option<AnswerBlock> {
    let kind = kinds.first().copied()?;
    if kind == LineKind::Plain || kinds.iter().any(|k| *k != kind) {
        return None;
    }
    let items: Vec<String> = lines.iter().map(|line| strip_item(kind, line)).collect();
    Some(match kind {
        LineKind::Bullet => AnswerBlock::UnorderedList { items },
        LineKind::Numeric => AnswerBlock::OrderedList {
            items,
            start: numeric_start(lines[0]),
            style: ListStyle::Decimal,
        },
        LineKind::Alpha => {
            let letter = lines[0].as_bytes()[0];
            let style = if letter.is_ascii_uppercase() {
                ListStyle::UpperAlpha
            } else {
                ListStyle::LowerAlpha
            };
            AnswerBlock::OrderedList {
                items,
                start: u32::from(letter.to_ascii_lowercase() - b'a') + 1,
                style,
            }
        }
        LineKind::Plain => unreachable!(),
    })
}

fn numeric_start(line: &str) -> u32 {
    let digits: String = line.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    digits.parse().unwrap_or(1)
}
