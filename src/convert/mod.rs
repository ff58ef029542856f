//! Converts downloaded transcript and meeting JSON files into Markdown.
//!
//! Records from the two fetch categories are paired by `document_id`; each
//! pairing renders to one Markdown document. A missing counterpart (notes
//! without a transcript, or vice versa) just omits that section.

pub mod markdown;

use crate::fetch::meetings::MeetingRecord;
use crate::fetch::transcripts::TranscriptRecord;
use crate::storage;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub transcripts_dir: PathBuf,
    pub meetings_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Only convert meetings created within the last N days.
    pub days: Option<i64>,
    /// Overwrite existing Markdown files.
    pub force: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Transcript and/or meeting record for one document id.
#[derive(Debug, Default)]
pub struct MeetingPair {
    pub transcript: Option<TranscriptRecord>,
    pub meeting: Option<MeetingRecord>,
}

impl MeetingPair {
    pub fn document_id(&self) -> &str {
        if let Some(meeting) = &self.meeting {
            return &meeting.document_id;
        }
        if let Some(transcript) = &self.transcript {
            return &transcript.document_id;
        }
        ""
    }

    /// The meeting record's title wins; transcript title is the fallback.
    pub fn title(&self) -> &str {
        self.meeting
            .as_ref()
            .map(|m| m.title.as_str())
            .or_else(|| self.transcript.as_ref().map(|t| t.title.as_str()))
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Untitled Meeting")
    }

    pub fn created_at(&self) -> Option<&str> {
        self.meeting
            .as_ref()
            .and_then(|m| m.created_at.as_deref())
            .or_else(|| self.transcript.as_ref().and_then(|t| t.created_at.as_deref()))
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.meeting
            .as_ref()
            .and_then(|m| m.updated_at.as_deref())
            .or_else(|| self.transcript.as_ref().and_then(|t| t.updated_at.as_deref()))
    }

    fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at().and_then(storage::parse_timestamp)
    }
}

/// Convert everything under the two input directories.
///
/// Malformed input files are logged, counted and skipped; they never abort
/// the run. At least one input directory must exist.
pub fn run(options: &ConvertOptions) -> Result<ConvertSummary> {
    if !options.transcripts_dir.exists() && !options.meetings_dir.exists() {
        bail!(
            "No input found: neither {} nor {} exists",
            options.transcripts_dir.display(),
            options.meetings_dir.display()
        );
    }

    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    info!("Transcripts directory: {}", options.transcripts_dir.display());
    info!("Meetings directory: {}", options.meetings_dir.display());
    info!("Output directory: {}", options.output_dir.display());

    let mut summary = ConvertSummary::default();
    let mut pairs: BTreeMap<String, MeetingPair> = BTreeMap::new();

    for record in load_records::<TranscriptRecord>(&options.transcripts_dir, &mut summary.errors)
    {
        let key = record.document_id.clone();
        pairs.entry(key).or_default().transcript = Some(record);
    }

    for record in load_records::<MeetingRecord>(&options.meetings_dir, &mut summary.errors) {
        let key = record.document_id.clone();
        pairs.entry(key).or_default().meeting = Some(record);
    }

    if pairs.is_empty() {
        info!("No records found to convert");
        return Ok(summary);
    }

    let cutoff = options.days.map(|days| Utc::now() - ChronoDuration::days(days));
    info!("Found {} meetings to convert", pairs.len());

    for pair in pairs.values() {
        if let (Some(cutoff), Some(created)) = (cutoff, pair.created_at_utc()) {
            if created < cutoff {
                debug!("Skipping {} (older than cutoff)", pair.document_id());
                continue;
            }
        }

        let filename = storage::output_filename(pair.created_at(), pair.title(), "md");
        let path = options.output_dir.join(&filename);

        if path.exists() && !options.force {
            debug!("Skipping {} (already exists)", filename);
            summary.skipped += 1;
            continue;
        }

        let rendered = markdown::render(pair);
        match storage::write_atomic(&path, rendered.as_bytes()) {
            Ok(()) => {
                debug!("Converted {}", filename);
                summary.converted += 1;
            }
            Err(err) => {
                warn!("Failed to write {}: {:#}", filename, err);
                summary.errors += 1;
            }
        }
    }

    info!("Conversion complete");
    info!("Converted: {}", summary.converted);
    info!("Skipped: {} (already exist)", summary.skipped);
    info!("Errors: {}", summary.errors);

    Ok(summary)
}

/// Read every `*.json` file in `dir` as a record of type `T`. Files that
/// fail to read or parse increment `errors` and are skipped.
fn load_records<T: DeserializeOwned>(dir: &Path, errors: &mut usize) -> Vec<T> {
    if !dir.exists() {
        debug!("Input directory {} does not exist, skipping", dir.display());
        return Vec::new();
    }

    let mut records = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("json")
        {
            continue;
        }

        match read_record::<T>(path) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("Skipping {}: {:#}", path.display(), err);
                *errors += 1;
            }
        }
    }

    records
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid record", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_prefers_meeting_fields() {
        let transcript: TranscriptRecord = serde_json::from_value(serde_json::json!({
            "document_id": "d1",
            "title": "From transcript",
            "created_at": "2025-01-01T00:00:00Z",
            "download_timestamp": "2025-01-02T00:00:00Z",
            "transcript_entries": [],
        }))
        .unwrap();

        let meeting: MeetingRecord = serde_json::from_value(serde_json::json!({
            "document_id": "d1",
            "title": "From meeting",
            "created_at": "2025-02-02T00:00:00Z",
            "download_timestamp": "2025-01-02T00:00:00Z",
        }))
        .unwrap();

        let pair = MeetingPair {
            transcript: Some(transcript),
            meeting: Some(meeting),
        };

        assert_eq!(pair.title(), "From meeting");
        assert_eq!(pair.created_at(), Some("2025-02-02T00:00:00Z"));
        assert_eq!(pair.document_id(), "d1");
    }

    #[test]
    fn test_pair_falls_back_to_transcript() {
        let transcript: TranscriptRecord = serde_json::from_value(serde_json::json!({
            "document_id": "d2",
            "title": "Only transcript",
            "download_timestamp": "2025-01-02T00:00:00Z",
            "transcript_entries": [],
        }))
        .unwrap();

        let pair = MeetingPair {
            transcript: Some(transcript),
            meeting: None,
        };

        assert_eq!(pair.title(), "Only transcript");
        assert_eq!(pair.document_id(), "d2");
        assert_eq!(pair.created_at(), None);
    }
}
