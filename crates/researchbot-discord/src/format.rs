//! Response decoration and message chunking.
//!
//! Model output is wrapped in a titled template per command, then split into
//! transport-sized pieces when it exceeds Discord's message limit.

use chrono::{DateTime, Local};

use researchbot_core::config::{DISCORD_CHUNK_SIZE, DISCORD_MESSAGE_LIMIT};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which template wraps a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Research,
    Analysis,
    Summary,
    Report,
}

/// Decorate `body` for `kind`, stamped with the current local time.
pub fn format(kind: ReportKind, topic: &str, body: &str) -> String {
    format_at(kind, topic, body, Local::now())
}

/// [`format`] with an explicit generation time.
pub fn format_at(kind: ReportKind, topic: &str, body: &str, at: DateTime<Local>) -> String {
    let generated = at.format(TIMESTAMP_FORMAT);
    match kind {
        ReportKind::Research => format!(
            "\u{1f4ca} **Research Report: {topic}**\n{RULE}\n\n{body}\n\n{RULE}\n\
             \u{1f552} Generated: {generated}\n\u{1f916} Powered by Sentient Research Agent"
        ),
        ReportKind::Analysis => format!("\u{1f4ca} **Analysis Report**\n{RULE}\n{body}"),
        ReportKind::Summary => format!("\u{1f4c4} **Summary**\n{RULE}\n{body}"),
        ReportKind::Report => format!(
            "\u{1f4cb} **COMPREHENSIVE REPORT**\n**Topic:** {topic}\n**Generated:** {generated}\n\
             {RULE}\n\n{body}\n\n{RULE}\n\
             \u{1f916} **Sentient Research Agent** | Built for Sentient Builder Program"
        ),
    }
}

/// How a multi-chunk response is laid out and paced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStyle {
    /// Raw chunks, sent back to back.
    Plain,
    /// Every chunk after the first carries a `Continued (i/total)` header.
    Continued,
    /// Raw chunks with a pause between consecutive sends.
    Paced,
}

impl ReportKind {
    pub fn chunk_style(self) -> ChunkStyle {
        match self {
            ReportKind::Research => ChunkStyle::Continued,
            ReportKind::Report => ChunkStyle::Paced,
            ReportKind::Analysis | ReportKind::Summary => ChunkStyle::Plain,
        }
    }
}

/// Split `text` for a transport that rejects messages over `limit` characters.
///
/// Text within `limit` is returned whole. Anything longer is hard-cut into
/// consecutive pieces of at most `soft_limit` characters, with no regard for
/// word boundaries. Lengths are counted in chars, never bytes, so a cut can
/// not land inside a multi-byte character.
pub fn chunk(text: &str, limit: usize, soft_limit: usize) -> Vec<String> {
    if text.chars().count() <= limit || soft_limit == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == soft_limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Chunk with Discord's limits and apply `style`'s continuation headers.
pub fn discord_messages(text: &str, style: ChunkStyle) -> Vec<String> {
    let chunks = chunk(text, DISCORD_MESSAGE_LIMIT, DISCORD_CHUNK_SIZE);
    if style != ChunkStyle::Continued || chunks.len() == 1 {
        return chunks;
    }

    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c
            } else {
                format!("{}{}", continuation_prefix(i + 1, total), c)
            }
        })
        .collect()
}

/// Header put in front of follow-up research chunks.
pub fn continuation_prefix(index: usize, total: usize) -> String {
    format!("**Continued ({index}/{total}):**\n")
}
