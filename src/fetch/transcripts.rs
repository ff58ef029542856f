//! Transcript export: one JSON file per meeting that has a transcript.

use super::Exporter;
use crate::api::models::{Document, TranscriptEntry};
use crate::api::GranolaClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// On-disk format of a downloaded transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub download_timestamp: String,
    pub transcript_entries: Vec<TranscriptEntry>,
}

pub struct TranscriptExporter;

#[async_trait]
impl Exporter for TranscriptExporter {
    fn name(&self) -> &'static str {
        "transcripts"
    }

    fn include_panel(&self) -> bool {
        false
    }

    async fn payload(&self, client: &GranolaClient, doc: &Document) -> Result<Option<Value>> {
        let Some(entries) = client.fetch_transcript(&doc.id).await? else {
            return Ok(None);
        };

        let record = TranscriptRecord {
            document_id: doc.id.clone(),
            title: doc.display_title().to_string(),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            download_timestamp: Utc::now().to_rfc3339(),
            transcript_entries: entries,
        };

        let value =
            serde_json::to_value(record).context("Failed to serialize transcript record")?;
        Ok(Some(value))
    }
}
