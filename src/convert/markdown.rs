//! Markdown rendering for exported meeting records.

use super::MeetingPair;
use crate::api::models::TranscriptEntry;
use crate::fetch::meetings::MeetingRecord;
use crate::storage;
use serde_json::Value;
use std::collections::BTreeSet;

/// Render one meeting (transcript and/or notes) into a Markdown document.
/// A missing counterpart just omits its section.
pub fn render(pair: &MeetingPair) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", pair.title()));

    let date = pair
        .created_at()
        .map(format_display_datetime)
        .unwrap_or_else(|| "Unknown".to_string());
    out.push_str(&format!("**Date:** {}\n", date));

    let updated = pair
        .updated_at()
        .map(format_display_datetime)
        .unwrap_or_else(|| "Unknown".to_string());
    out.push_str(&format!("**Updated:** {}\n", updated));

    let entries = pair
        .transcript
        .as_ref()
        .map(|t| t.transcript_entries.as_slice());

    if let Some(entries) = entries {
        let duration = duration_from_entries(entries).unwrap_or_else(|| "Unknown".to_string());
        out.push_str(&format!("**Duration:** {}\n", duration));
    }

    out.push_str(&format!("**Document ID:** `{}`\n", pair.document_id()));
    out.push_str("\n---\n");

    if let Some(summary) = pair.meeting.as_ref().and_then(meeting_summary) {
        out.push_str("\n## Summary\n\n");
        out.push_str(&summary);
        out.push_str("\n\n---\n");
    }

    if let Some(entries) = entries {
        let stats = TranscriptStats::from_entries(entries);
        out.push_str("\n## Meeting Statistics\n\n");
        out.push_str(&format!("- **Total Entries:** {}\n", stats.total_entries));
        out.push_str(&format!("- **Speakers:** {}\n", stats.speakers));
        out.push_str(&format!("- **Total Words:** {}\n", stats.words));
        out.push_str("\n---\n");

        out.push_str("\n## Transcript\n\n");
        out.push_str(&format_transcript(entries));
        out.push_str("\n\n---\n");
    }

    out.push_str("\n*Exported from Granola*\n");
    out
}

/// The notes body for the summary section: rendered markdown when the app
/// produced it, else plain notes, else a flattening of the structured panel.
pub fn meeting_summary(meeting: &MeetingRecord) -> Option<String> {
    let markdown = meeting.notes.notes_markdown.trim();
    if !markdown.is_empty() {
        return Some(markdown.to_string());
    }

    let plain = meeting.notes.notes_plain.trim();
    if !plain.is_empty() {
        return Some(plain.to_string());
    }

    meeting
        .notes
        .last_viewed_panel
        .as_ref()
        .and_then(panel_to_markdown)
}

/// Flatten the app's structured note panel (a ProseMirror-style document)
/// into plain Markdown. Only headings, paragraphs and bullet lists are
/// rendered; unknown node types contribute their children.
pub fn panel_to_markdown(panel: &Value) -> Option<String> {
    let content = panel.get("content")?;
    let mut out = String::new();
    render_node(content, 0, &mut out);

    let trimmed = out.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn render_node(node: &Value, depth: usize, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("heading") => {
            let level = node
                .get("attrs")
                .and_then(|attrs| attrs.get("level"))
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            out.push('\n');
            out.push_str(&"#".repeat(level));
            out.push(' ');
            render_children(node, depth, out);
            out.push('\n');
        }
        Some("paragraph") => {
            render_children(node, depth, out);
            out.push('\n');
        }
        Some("bulletList") | Some("bullet_list") => {
            render_children(node, depth + 1, out);
        }
        Some("listItem") | Some("list_item") => {
            out.push_str(&"  ".repeat(depth.saturating_sub(1)));
            out.push_str("- ");
            render_children(node, depth, out);
        }
        _ => render_children(node, depth, out),
    }
}

fn render_children(node: &Value, depth: usize, out: &mut String) {
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            render_node(child, depth, out);
        }
    }
}

/// Long human-readable form of an API timestamp, e.g.
/// `Monday, June 02, 2025 at 09:30 AM`. Unparseable input passes through.
fn format_display_datetime(raw: &str) -> String {
    match storage::parse_timestamp(raw) {
        Some(ts) => ts.format("%A, %B %d, %Y at %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// Clock time for per-utterance prefixes. Unparseable input passes through.
fn format_clock_time(raw: &str) -> String {
    match storage::parse_timestamp(raw) {
        Some(ts) => ts.format("%H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

/// Local-mic entries are attributed to `me`; remote entries use the
/// diarized speaker name when present, else `them`.
fn speaker_name(entry: &TranscriptEntry) -> String {
    if entry.source.as_deref() == Some("microphone") {
        return "me".to_string();
    }
    match entry.speaker.as_deref().map(str::trim) {
        Some(speaker) if !speaker.is_empty() => speaker.to_string(),
        _ => "them".to_string(),
    }
}

fn sorted_entries(entries: &[TranscriptEntry]) -> Vec<&TranscriptEntry> {
    let mut sorted: Vec<&TranscriptEntry> = entries.iter().collect();

    if entries.iter().any(|e| e.sequence_number.is_some()) {
        sorted.sort_by_key(|e| e.sequence_number.unwrap_or(i64::MAX));
    } else if entries.iter().any(|e| e.start_timestamp.is_some()) {
        sorted.sort_by(|a, b| a.start_timestamp.cmp(&b.start_timestamp));
    }

    sorted
}

pub fn format_transcript(entries: &[TranscriptEntry]) -> String {
    let mut lines = Vec::new();

    for entry in sorted_entries(entries) {
        let text = match entry.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => continue,
        };

        let speaker = speaker_name(entry);
        match entry.start_timestamp.as_deref() {
            Some(ts) => lines.push(format!(
                "**[{}] {}:** {}",
                format_clock_time(ts),
                speaker,
                text
            )),
            None => lines.push(format!("**{}:** {}", speaker, text)),
        }
    }

    if lines.is_empty() {
        return "*No transcript available*".to_string();
    }

    lines.join("\n\n")
}

#[derive(Debug, PartialEq, Eq)]
pub struct TranscriptStats {
    pub total_entries: usize,
    pub speakers: usize,
    pub words: usize,
}

impl TranscriptStats {
    pub fn from_entries(entries: &[TranscriptEntry]) -> Self {
        let mut speakers = BTreeSet::new();
        let mut words = 0;

        for entry in entries {
            speakers.insert(speaker_name(entry));
            if let Some(text) = entry.text.as_deref() {
                words += text.split_whitespace().count();
            }
        }

        Self {
            total_entries: entries.len(),
            speakers: speakers.len(),
            words,
        }
    }
}

/// Approximate meeting length from the earliest start and latest end
/// timestamps across all entries.
pub fn duration_from_entries(entries: &[TranscriptEntry]) -> Option<String> {
    let start = entries
        .iter()
        .filter_map(|e| e.start_timestamp.as_deref())
        .filter_map(storage::parse_timestamp)
        .min()?;
    let end = entries
        .iter()
        .filter_map(|e| e.end_timestamp.as_deref())
        .filter_map(storage::parse_timestamp)
        .max()?;

    let duration = end.signed_duration_since(start);
    if duration.num_seconds() < 0 {
        return None;
    }

    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;

    if hours > 0 {
        Some(format!(
            "{} hour{} {} minute{}",
            hours,
            if hours > 1 { "s" } else { "" },
            minutes,
            if minutes != 1 { "s" } else { "" }
        ))
    } else {
        Some(format!(
            "{} minute{}",
            minutes,
            if minutes != 1 { "s" } else { "" }
        ))
    }
}
