//! Meeting export: one JSON file per meeting with its notes and metadata.
//!
//! Unlike transcripts this needs no per-document API call; the listing
//! response already carries everything, it just gets reshaped for disk.

use super::Exporter;
use crate::api::models::Document;
use crate::api::GranolaClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// On-disk format of a downloaded meeting record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub download_timestamp: String,
    #[serde(default)]
    pub metadata: MeetingMetadata,
    #[serde(default)]
    pub notes: MeetingNotes,
    #[serde(default)]
    pub calendar_info: CalendarInfo,
    /// Complete listing response for this document, for reference.
    #[serde(default)]
    pub raw_document: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingMetadata {
    pub public: bool,
    pub transcribe: bool,
    pub privacy_mode_enabled: bool,
    pub valid_meeting: bool,
    pub user_id: String,
    pub deleted_at: Option<Value>,
    pub template_id: Option<Value>,
    pub sharing_settings: Option<Value>,
    pub workspace_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingNotes {
    pub notes_plain: String,
    pub notes_markdown: String,
    pub notes: Option<Value>,
    pub last_viewed_panel: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarInfo {
    pub google_calendar_event: Option<Value>,
    pub outlook_event: Option<Value>,
    pub zoom_meeting: Option<Value>,
}

impl MeetingRecord {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let raw_document =
            serde_json::to_value(doc).context("Failed to serialize raw document")?;

        Ok(Self {
            document_id: doc.id.clone(),
            title: doc.display_title().to_string(),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            download_timestamp: Utc::now().to_rfc3339(),
            metadata: MeetingMetadata {
                public: doc.public.unwrap_or(false),
                transcribe: doc.transcribe.unwrap_or(false),
                privacy_mode_enabled: doc.privacy_mode_enabled.unwrap_or(false),
                valid_meeting: doc.valid_meeting.unwrap_or(false),
                user_id: doc.user_id.clone().unwrap_or_default(),
                deleted_at: doc.deleted_at.clone(),
                template_id: doc.template_id.clone(),
                sharing_settings: doc.sharing_settings.clone(),
                workspace_id: doc.workspace_id.clone(),
            },
            notes: MeetingNotes {
                notes_plain: doc.notes_plain.clone().unwrap_or_default(),
                notes_markdown: doc.notes_markdown.clone().unwrap_or_default(),
                notes: doc.notes.clone(),
                last_viewed_panel: doc.last_viewed_panel.clone(),
            },
            calendar_info: CalendarInfo {
                google_calendar_event: doc.google_calendar_event.clone(),
                outlook_event: doc.outlook_event.clone(),
                zoom_meeting: doc.zoom_meeting.clone(),
            },
            raw_document,
        })
    }
}

pub struct MeetingExporter;

#[async_trait]
impl Exporter for MeetingExporter {
    fn name(&self) -> &'static str {
        "meetings"
    }

    fn include_panel(&self) -> bool {
        true
    }

    async fn payload(&self, _client: &GranolaClient, doc: &Document) -> Result<Option<Value>> {
        let record = MeetingRecord::from_document(doc)?;
        let value = serde_json::to_value(record).context("Failed to serialize meeting record")?;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_document_reshapes_fields() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": "doc-7",
            "title": "Roadmap review",
            "created_at": "2025-06-02T09:30:00Z",
            "notes_markdown": "## Agenda",
            "valid_meeting": true,
            "user_id": "user-1",
            "google_calendar_event": {"summary": "Roadmap review"},
            "some_future_field": 42,
        }))
        .unwrap();

        let record = MeetingRecord::from_document(&doc).unwrap();
        assert_eq!(record.document_id, "doc-7");
        assert_eq!(record.title, "Roadmap review");
        assert!(record.metadata.valid_meeting);
        assert!(!record.metadata.public);
        assert_eq!(record.metadata.user_id, "user-1");
        assert_eq!(record.notes.notes_markdown, "## Agenda");
        assert!(record.calendar_info.google_calendar_event.is_some());
        // The raw document keeps fields the typed model does not know about
        assert_eq!(record.raw_document["some_future_field"], 42);
    }

    #[test]
    fn test_untitled_document_gets_fallback_title() {
        let doc: Document =
            serde_json::from_value(serde_json::json!({"id": "doc-8"})).unwrap();
        let record = MeetingRecord::from_document(&doc).unwrap();
        assert_eq!(record.title, "Untitled Meeting");
    }
}
