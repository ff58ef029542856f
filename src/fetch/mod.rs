//! Shared download pipeline for the transcript and meeting exports.
//!
//! Both subcommands enumerate the same document listing and differ only in
//! the payload written per document, so the loop lives here and each
//! category implements [`Exporter`].

pub mod meetings;
pub mod transcripts;

use crate::api::models::Document;
use crate::api::GranolaClient;
use crate::storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// One export category (transcripts or meeting records).
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Category name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Whether the document listing should include panel data. Transcript
    /// runs skip it; meeting runs need it for the notes.
    fn include_panel(&self) -> bool;

    /// Build the JSON payload to write for one document. `None` means the
    /// document has no data in this category, which is not an error.
    async fn payload(&self, client: &GranolaClient, doc: &Document) -> Result<Option<Value>>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub output_dir: PathBuf,
    /// Only process documents created within the last N days.
    pub days: Option<i64>,
    /// Overwrite existing output files.
    pub force: bool,
    /// Polite delay between per-document downloads.
    pub item_delay: Duration,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub no_data: usize,
    pub errors: usize,
}

enum Outcome {
    Written,
    Skipped,
    NoData,
}

/// Run one export over the full document listing.
///
/// Per-document failures are logged and counted but never abort the run; a
/// failure to enumerate the listing itself is fatal.
pub async fn run(
    client: &GranolaClient,
    exporter: &dyn Exporter,
    options: &FetchOptions,
) -> Result<FetchSummary> {
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;
    info!("Output directory: {}", options.output_dir.display());

    let documents = client.list_documents(exporter.include_panel()).await?;
    let documents = filter_by_age(documents, options.days);

    if documents.is_empty() {
        info!("No documents found matching criteria");
        return Ok(FetchSummary::default());
    }

    info!(
        "Starting {} export for {} documents",
        exporter.name(),
        documents.len()
    );

    let progress = create_progress_bar(documents.len() as u64);
    let total = documents.len();
    let mut summary = FetchSummary::default();

    for (index, doc) in documents.iter().enumerate() {
        progress.set_message(doc.display_title().to_string());
        debug!(
            "Processing [{}/{}]: {}",
            index + 1,
            total,
            doc.display_title()
        );

        match export_document(client, exporter, options, doc).await {
            Ok(Outcome::Written) => summary.downloaded += 1,
            Ok(Outcome::Skipped) => summary.skipped += 1,
            Ok(Outcome::NoData) => summary.no_data += 1,
            Err(err) => {
                warn!(
                    "Failed to export {} for '{}': {:#}",
                    exporter.name(),
                    doc.display_title(),
                    err
                );
                summary.errors += 1;
            }
        }

        progress.inc(1);
        if index + 1 < total {
            sleep(options.item_delay).await;
        }
    }

    progress.finish_and_clear();

    info!("{} export complete", exporter.name());
    info!("Downloaded: {}", summary.downloaded);
    info!("Skipped: {} (already exist)", summary.skipped);
    info!("No data: {}", summary.no_data);
    info!("Errors: {}", summary.errors);

    Ok(summary)
}

async fn export_document(
    client: &GranolaClient,
    exporter: &dyn Exporter,
    options: &FetchOptions,
    doc: &Document,
) -> Result<Outcome> {
    let filename =
        storage::output_filename(doc.created_at.as_deref(), doc.display_title(), "json");
    let path = options.output_dir.join(&filename);

    if path.exists() && !options.force {
        debug!("Skipping {} (already exists)", filename);
        return Ok(Outcome::Skipped);
    }

    let Some(payload) = exporter.payload(client, doc).await? else {
        debug!(
            "No {} data for '{}'",
            exporter.name(),
            doc.display_title()
        );
        return Ok(Outcome::NoData);
    };

    storage::write_json_atomic(&path, &payload)?;
    debug!("Saved {}", filename);
    Ok(Outcome::Written)
}

/// Keep documents created within the last `days` days. Documents with a
/// missing or unparseable creation date are kept.
pub fn filter_by_age(documents: Vec<Document>, days: Option<i64>) -> Vec<Document> {
    let Some(days) = days else {
        return documents;
    };

    let cutoff = Utc::now() - ChronoDuration::days(days);
    let total = documents.len();

    let kept: Vec<Document> = documents
        .into_iter()
        .filter(|doc| match doc.created_at_utc() {
            Some(created) => created >= cutoff,
            None => true,
        })
        .collect();

    info!(
        "Filtered to {} of {} documents from the last {} days",
        kept.len(),
        total,
        days
    );
    kept
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, created_at: Option<&str>) -> Document {
        let mut value = serde_json::json!({"id": id});
        if let Some(ts) = created_at {
            value["created_at"] = serde_json::json!(ts);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_filter_none_keeps_everything() {
        let docs = vec![doc("a", Some("2001-01-01T00:00:00Z")), doc("b", None)];
        assert_eq!(filter_by_age(docs, None).len(), 2);
    }

    #[test]
    fn test_filter_drops_old_documents() {
        let recent = Utc::now() - ChronoDuration::days(1);
        let docs = vec![
            doc("old", Some("2001-01-01T00:00:00Z")),
            doc("new", Some(&recent.to_rfc3339())),
        ];

        let kept = filter_by_age(docs, Some(7));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "new");
    }

    #[test]
    fn test_filter_keeps_unparseable_dates() {
        let docs = vec![doc("weird", Some("not a date")), doc("missing", None)];
        assert_eq!(filter_by_age(docs, Some(7)).len(), 2);
    }
}
