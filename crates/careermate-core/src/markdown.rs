//! Fixed-grammar formatter for bot replies.
//!
//! Supports the small subset the model is asked to produce:
//! - blocks separated by a blank line (`"\n\n"`)
//! - list lines starting with `"* "`
//! - `**strong**` and `*emphasis*` spans
//!
//! Everything else is passed through as text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    /// Emphasis nested inside a strong span.
    StrongEmphasis(String),
}

/// One rendered line: a paragraph line or a list item.
pub type Line = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "lines", rename_all = "snake_case")]
pub enum Block {
    /// Consecutive text lines, rendered with line breaks between them.
    Paragraph(Vec<Line>),
    /// Bulleted items.
    List(Vec<Line>),
}

const LIST_MARKER: &str = "* ";

pub fn parse_markdown(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for block in text.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut paragraph: Vec<Line> = Vec::new();
        let mut list: Vec<Line> = Vec::new();

        for line in block.split('\n') {
            let trimmed = line.trim();
            if let Some(item) = trimmed.strip_prefix(LIST_MARKER) {
                flush(&mut blocks, &mut paragraph, Block::Paragraph);
                list.push(parse_inline(item));
            } else {
                flush(&mut blocks, &mut list, Block::List);
                if !trimmed.is_empty() {
                    paragraph.push(parse_inline(line));
                }
            }
        }

        flush(&mut blocks, &mut paragraph, Block::Paragraph);
        flush(&mut blocks, &mut list, Block::List);
    }

    blocks
}

fn flush(blocks: &mut Vec<Block>, pending: &mut Vec<Line>, make: fn(Vec<Line>) -> Block) {
    if !pending.is_empty() {
        blocks.push(make(std::mem::take(pending)));
    }
}

/// Split a line into text, strong and emphasis spans.
///
/// Strong spans are matched first; emphasis is then matched both between
/// and inside them. Spans are shortest-match and an empty span stays literal.
pub fn parse_inline(line: &str) -> Line {
    let mut out = Vec::new();

    for (segment, strong) in split_delimited(line, "**") {
        if strong {
            for (piece, emphasis) in split_delimited(segment, "*") {
                out.push(if emphasis {
                    Inline::StrongEmphasis(piece.to_string())
                } else {
                    Inline::Strong(piece.to_string())
                });
            }
            continue;
        }
        for (piece, emphasis) in split_delimited(segment, "*") {
            if emphasis {
                out.push(Inline::Emphasis(piece.to_string()));
            } else {
                push_text(&mut out, piece);
            }
        }
    }

    out
}

fn push_text(out: &mut Line, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

/// Returns `(slice, delimited)` pairs covering all of `text`.
fn split_delimited<'a>(text: &'a str, marker: &str) -> Vec<(&'a str, bool)> {
    let mut parts = Vec::new();
    let mut rest = text;
    let mut literal_start = 0usize;
    let mut cursor = 0usize;

    while let Some(open) = rest[cursor..].find(marker).map(|i| cursor + i) {
        let inner_start = open + marker.len();
        let Some(close) = rest[inner_start..].find(marker).map(|i| inner_start + i) else {
            break;
        };

        if close == inner_start {
            // Empty span: keep the markers as text and move past the opener.
            cursor = inner_start;
            continue;
        }

        if open > literal_start {
            parts.push((&rest[literal_start..open], false));
        }
        parts.push((&rest[inner_start..close], true));

        let next = close + marker.len();
        rest = &rest[next..];
        literal_start = 0;
        cursor = 0;
    }

    if literal_start < rest.len() {
        parts.push((&rest[literal_start..], false));
    }

    parts
}
