//! Terminal rendering of conversation events.

use std::io::{self, Write};

use colored::Colorize;

use careermate_chat::ConversationEvent;
use careermate_core::markdown::parse_inline;
use careermate_core::prompts::Suggestion;
use careermate_core::{parse_markdown, Block, Citation, Inline, Message, Sender};

const BOT_LABEL: &str = "CareerMate:";
const THINKING: &str = "CareerMate is thinking...";
const CLEAR_LINE: &str = "\r\x1b[2K";
const LIST_MARKER: &str = "* ";

fn render_inline(inline: &Inline) -> String {
    match inline {
        Inline::Text(text) => text.clone(),
        Inline::Strong(text) => text.bold().to_string(),
        Inline::Emphasis(text) => text.italic().to_string(),
        Inline::StrongEmphasis(text) => text.bold().italic().to_string(),
    }
}

fn render_line(line: &[Inline]) -> String {
    line.iter().map(render_inline).collect()
}

/// Format bot text for the terminal: bold/italic spans, bulleted lists,
/// one blank line between blocks.
pub fn render_markdown(text: &str) -> String {
    parse_markdown(text)
        .iter()
        .map(|block| match block {
            Block::Paragraph(lines) => lines
                .iter()
                .map(|line| render_line(line))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::List(items) => items
                .iter()
                .map(|item| format!("  • {}", render_line(item)))
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_sources(sources: &[Citation]) -> String {
    let mut out = "Sources from Google Maps:".bold().to_string();
    for source in sources {
        out.push_str(&format!(
            "\n  - {} {}",
            source.title.blue().underline(),
            format!("({})", source.uri).dimmed()
        ));
    }
    out
}

/// Complete, non-streamed rendering of one message.
pub fn render_message(message: &Message) -> String {
    match message.sender {
        Sender::User => format!("{} {}", "You:".cyan().bold(), message.content),
        Sender::Bot => {
            let mut out = format!(
                "{}\n{}",
                BOT_LABEL.green().bold(),
                render_markdown(&message.content)
            );
            if let Some(sources) = message.sources.as_deref().filter(|s| !s.is_empty()) {
                out.push_str("\n\n");
                out.push_str(&render_sources(sources));
            }
            out
        }
    }
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    let mut out = "Try one of these:".dimmed().to_string();
    for (i, suggestion) in suggestions.iter().enumerate() {
        out.push_str(&format!(
            "\n  {} {} {}",
            format!("[{}]", i + 1).yellow(),
            suggestion.title.bold(),
            format!("\"{}\"", suggestion.text).dimmed()
        ));
    }
    out
}

/// The part of `content` not yet printed, or `None` if the running content
/// no longer extends what was shown.
pub fn unseen_suffix<'a>(content: &'a str, shown: &str) -> Option<&'a str> {
    content.strip_prefix(shown)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Paragraph,
    ListItem,
}

/// Incremental markdown formatting for a reply that is still arriving.
///
/// Each completed line is formatted as soon as its newline arrives; the
/// trailing partial line waits for [`LiveMarkdown::finish`]. The concatenated
/// output equals `render_markdown` of the full text plus a final newline.
#[derive(Debug, Default)]
pub struct LiveMarkdown {
    pending: String,
    last: Option<LineKind>,
    gap: bool,
}

impl LiveMarkdown {
    pub fn push(&mut self, text: &str) -> String {
        self.pending.push_str(text);
        let mut out = String::new();
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            self.emit_line(line.trim_end_matches('\n'), &mut out);
        }
        out
    }

    pub fn finish(&mut self) -> String {
        let line = std::mem::take(&mut self.pending);
        let mut out = String::new();
        self.emit_line(&line, &mut out);
        out
    }

    fn emit_line(&mut self, line: &str, out: &mut String) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if self.last.is_some() {
                self.gap = true;
            }
            return;
        }

        let (kind, rendered) = match trimmed.strip_prefix(LIST_MARKER) {
            Some(item) => (
                LineKind::ListItem,
                format!("  • {}", render_line(&parse_inline(item))),
            ),
            None => (LineKind::Paragraph, render_line(&parse_inline(trimmed))),
        };

        // Blank line between blocks, and where a list meets a paragraph.
        if let Some(last) = self.last {
            if self.gap || last != kind {
                out.push('\n');
            }
        }
        out.push_str(&rendered);
        out.push('\n');

        self.last = Some(kind);
        self.gap = false;
    }
}

struct StreamingMessage {
    id: String,
    shown: String,
    live: LiveMarkdown,
}

/// Applies conversation events to a terminal writer.
///
/// An empty bot message opens a live region: later updates feed only their
/// new suffix through [`LiveMarkdown`]. Any other bot message is printed whole.
#[derive(Default)]
pub struct EventRenderer {
    streaming: Option<StreamingMessage>,
    thinking: bool,
}

impl EventRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle<W: Write>(&mut self, event: &ConversationEvent, out: &mut W) -> io::Result<()> {
        match event {
            ConversationEvent::LoadingChanged { loading: true } => {
                write!(out, "{}", THINKING.dimmed().italic())?;
                self.thinking = true;
            }
            ConversationEvent::LoadingChanged { loading: false } => {
                self.clear_thinking(out)?;
                if let Some(mut streaming) = self.streaming.take() {
                    write!(out, "{}", streaming.live.finish())?;
                }
                writeln!(out)?;
            }
            ConversationEvent::MessageAppended { message } => {
                if message.sender == Sender::User {
                    return Ok(());
                }
                self.clear_thinking(out)?;
                if message.content.is_empty() {
                    writeln!(out, "{}", BOT_LABEL.green().bold())?;
                    self.streaming = Some(StreamingMessage {
                        id: message.id.clone(),
                        shown: String::new(),
                        live: LiveMarkdown::default(),
                    });
                } else {
                    writeln!(out, "{}", render_message(message))?;
                }
            }
            ConversationEvent::MessageUpdated { id, content } => {
                let Some(streaming) = self.streaming.as_mut().filter(|s| &s.id == id) else {
                    log::debug!("Update for message {} outside the live region", id);
                    return Ok(());
                };
                let formatted = match unseen_suffix(content, &streaming.shown) {
                    Some(suffix) => streaming.live.push(suffix),
                    None => {
                        // Content was rewritten rather than extended: start over.
                        streaming.live = LiveMarkdown::default();
                        format!("\n{}", streaming.live.push(content))
                    }
                };
                write!(out, "{}", formatted)?;
                streaming.shown.clear();
                streaming.shown.push_str(content);
            }
        }
        out.flush()
    }

    fn clear_thinking<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.thinking {
            write!(out, "{}", CLEAR_LINE)?;
            self.thinking = false;
        }
        Ok(())
    }
}
