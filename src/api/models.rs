//! Wire models for the Granola API.
//!
//! Fields the pipeline inspects are typed; everything else is captured by a
//! flattened map so the record written to disk keeps the complete API
//! response.

use crate::storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One meeting document as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_plain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_panel: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcribe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_mode_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_meeting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharing_settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_event: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlook_event: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_meeting: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Title for logs and filenames; the API leaves untitled meetings null.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled Meeting")
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(storage::parse_timestamp)
    }
}

/// Response body of `POST /v2/get-documents`.
#[derive(Debug, Deserialize)]
pub struct DocumentsPage {
    #[serde(default)]
    pub docs: Vec<Document>,
}

/// Request body of `POST /v2/get-documents`.
#[derive(Debug, Serialize)]
pub struct DocumentsRequest {
    pub limit: usize,
    pub offset: usize,
    pub include_last_viewed_panel: bool,
}

/// Request body of `POST /v1/get-document-transcript`.
#[derive(Debug, Serialize)]
pub struct TranscriptRequest<'a> {
    pub document_id: &'a str,
}

/// One utterance in a meeting transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `"microphone"` for the local speaker, `"system"` for remote audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_roundtrip_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "id": "doc-1",
            "title": "Planning",
            "created_at": "2025-06-02T09:30:00Z",
            "people": [{"name": "Sam"}],
            "overview": "some field this crate has never heard of",
        });

        let doc: Document = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.extra["overview"], raw["overview"]);

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["people"], raw["people"]);
        assert_eq!(back["overview"], raw["overview"]);
        // Absent optional fields stay absent instead of becoming null
        assert!(back.get("notes_plain").is_none());
    }

    #[test]
    fn test_display_title_fallback() {
        let doc: Document = serde_json::from_value(serde_json::json!({"id": "x"})).unwrap();
        assert_eq!(doc.display_title(), "Untitled Meeting");

        let doc: Document =
            serde_json::from_value(serde_json::json!({"id": "x", "title": "  "})).unwrap();
        assert_eq!(doc.display_title(), "Untitled Meeting");
    }

    #[test]
    fn test_created_at_parsing() {
        let doc: Document = serde_json::from_value(
            serde_json::json!({"id": "x", "created_at": "2025-06-02T09:30:00Z"}),
        )
        .unwrap();
        assert!(doc.created_at_utc().is_some());

        let doc: Document =
            serde_json::from_value(serde_json::json!({"id": "x", "created_at": "junk"}))
                .unwrap();
        assert!(doc.created_at_utc().is_none());
    }
}
