//! Filename derivation and whole-file atomic writes for exported records.
//!
//! Output files are named `YYYY-MM-DD_<sanitized title>.<ext>` so that a
//! meeting maps to exactly one file per category and re-runs are idempotent.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const MAX_STEM_LEN: usize = 100;

/// Characters that are unsafe in filenames on at least one platform.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("hard-coded regex"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("hard-coded regex"));

/// Turn a meeting title into a filesystem-safe filename stem.
///
/// Strips unsafe characters, maps control characters to dashes, collapses
/// whitespace runs to a single underscore and bounds the length. Never
/// returns an empty string.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c))
        .map(|c| {
            if c.is_control() && !c.is_whitespace() {
                '-'
            } else {
                c
            }
        })
        .collect();

    let underscored = WHITESPACE.replace_all(cleaned.trim(), "_");
    let collapsed = DASH_RUNS.replace_all(&underscored, "-");

    let stem: String = collapsed
        .trim_matches(|c| c == '_' || c == '-')
        .chars()
        .take(MAX_STEM_LEN)
        .collect();

    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}

/// Parse an RFC 3339 timestamp as returned by the API (`Z` suffix or
/// explicit offset).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Derive the output filename for a record from its creation date and title.
///
/// Falls back to today's date when `created_at` is missing or unparseable.
pub fn output_filename(created_at: Option<&str>, title: &str, extension: &str) -> String {
    let date = created_at
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    format!(
        "{}_{}.{}",
        date.format("%Y-%m-%d"),
        sanitize_title(title),
        extension
    )
}

/// Write bytes to `path` via a temp file in the same directory followed by a
/// rename, so a crash mid-run cannot leave a truncated output file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move output file into place at {}", path.display()))?;

    Ok(())
}

/// Serialize a record as pretty-printed JSON and write it atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("Failed to serialize record")?;
    write_atomic(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_invalid_chars() {
        assert_eq!(sanitize_title("Q3 <Review>: a/b"), "Q3_Review_ab");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_title("  Weekly   sync \t meeting "), "Weekly_sync_meeting");
    }

    #[test]
    fn test_sanitize_collapses_dash_runs() {
        assert_eq!(sanitize_title("a\u{0007}\u{0008}b"), "a-b");
    }

    #[test]
    fn test_sanitize_never_empty() {
        assert_eq!(sanitize_title(""), "untitled");
        assert_eq!(sanitize_title("   "), "untitled");
        assert_eq!(sanitize_title("???"), "untitled");
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_title(&long).chars().count(), MAX_STEM_LEN);
    }

    #[test]
    fn test_output_filename_uses_created_date() {
        let name = output_filename(Some("2025-06-02T09:30:00Z"), "Standup", "json");
        assert_eq!(name, "2025-06-02_Standup.json");
    }

    #[test]
    fn test_output_filename_falls_back_to_today() {
        let name = output_filename(Some("not a date"), "Standup", "md");
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(name, format!("{}_Standup.md", today));
    }

    #[test]
    fn test_parse_timestamp_handles_z_suffix() {
        let ts = parse_timestamp("2025-06-02T09:30:00Z").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2025-06-02 09:30");
        assert!(parse_timestamp("2025-06-02T09:30:00+02:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_write_atomic_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_atomic(&path, b"hello").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        // Overwrites in place
        write_atomic(&path, b"world").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"world");

        // No temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_json_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");

        write_json_atomic(&path, &serde_json::json!({"id": "abc"})).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["id"], "abc");
    }
}
