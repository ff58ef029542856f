//! HTTP client for the Granola private REST API.
//!
//! All calls are POSTs authenticated with the bearer token from the desktop
//! app's credential cache. The API expects requests to identify themselves
//! as the desktop client, so the User-Agent and X-Client-Version headers
//! carry the configured client version.

pub mod models;

use crate::auth::Credential;
use crate::config::{ApiConfig, FetchConfig};
use anyhow::{bail, Context, Result};
use models::{Document, DocumentsPage, DocumentsRequest, TranscriptEntry, TranscriptRequest};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const DOCUMENTS_PATH: &str = "/v2/get-documents";
const TRANSCRIPT_PATH: &str = "/v1/get-document-transcript";

/// Transient failures (transport errors, 5xx) are retried exactly once
/// after this delay. 4xx responses are never retried.
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub struct GranolaClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    client_version: String,
    page_size: usize,
    page_delay: Duration,
}

impl GranolaClient {
    pub fn new(credential: &Credential, api: &ApiConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: credential.access_token.clone(),
            client_version: api.client_version.clone(),
            page_size: fetch.page_size.max(1),
            page_delay: Duration::from_millis(fetch.page_delay_ms),
        }
    }

    /// Enumerate all documents, paginating until a short or empty page.
    pub async fn list_documents(&self, include_panel: bool) -> Result<Vec<Document>> {
        let mut all_documents = Vec::new();
        let mut offset = 0;

        loop {
            debug!("Fetching documents with offset {}", offset);

            let request = DocumentsRequest {
                limit: self.page_size,
                offset,
                include_last_viewed_panel: include_panel,
            };

            let response = self.post_with_retry(DOCUMENTS_PATH, &request).await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                bail!(
                    "Authentication failed ({}). The cached Granola token may have expired — open the desktop app to refresh it.",
                    status
                );
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                bail!("Granola API returned HTTP {} listing documents: {}", status, body);
            }

            let page: DocumentsPage = response
                .json()
                .await
                .context("Failed to parse document listing response")?;

            let count = page.docs.len();
            all_documents.extend(page.docs);

            if count < self.page_size {
                break;
            }

            offset += self.page_size;
            sleep(self.page_delay).await;
        }

        info!("Fetched {} documents from the Granola API", all_documents.len());
        Ok(all_documents)
    }

    /// Fetch the transcript for one document. Returns `None` when the
    /// document has no transcript (404, or a body that is not the expected
    /// entry array).
    pub async fn fetch_transcript(
        &self,
        document_id: &str,
    ) -> Result<Option<Vec<TranscriptEntry>>> {
        let request = TranscriptRequest { document_id };
        let response = self.post_with_retry(TRANSCRIPT_PATH, &request).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("No transcript found for document {}", document_id);
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "Granola API returned HTTP {} fetching transcript for {}: {}",
                status,
                document_id,
                body
            );
        }

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse transcript response for {}", document_id))?;

        if !body.is_array() {
            warn!("Unexpected transcript format for document {}", document_id);
            return Ok(None);
        }

        let entries: Vec<TranscriptEntry> = serde_json::from_value(body)
            .with_context(|| format!("Failed to decode transcript entries for {}", document_id))?;

        Ok(Some(entries))
    }

    async fn post_with_retry<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut retried = false;

        loop {
            let result = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header("Accept", "*/*")
                .header("User-Agent", format!("Granola/{}", self.client_version))
                .header("X-Client-Version", &self.client_version)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_server_error() && !retried => {
                    warn!(
                        "Granola API returned HTTP {} for {}, retrying once",
                        response.status(),
                        path
                    );
                    retried = true;
                    sleep(RETRY_DELAY).await;
                }
                Ok(response) => return Ok(response),
                Err(err) if !retried => {
                    warn!("Request to {} failed ({}), retrying once", path, err);
                    retried = true;
                    sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to reach the Granola API at {}", url))
                }
            }
        }
    }
}
