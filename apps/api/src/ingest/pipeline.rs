//! Resume Pipeline — Fetching → Extracting → Sanitizing → StructuredExtraction →
//! Persisting → Responding.
//!
//! Only the first two stages can abort. From sanitizing onward every stage moves
//! forward, substituting defaults or logging instead of failing.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tracing::{error, info, info_span, Instrument};

use crate::config::IngestLimits;
use crate::ingest::extractor::{extract_text, is_long_enough};
use crate::ingest::fetcher::fetch_document;
use crate::ingest::models::{FileMetadata, ResumeRecord};
use crate::ingest::sanitizer::sanitize;
use crate::ingest::store::ResumeStore;
use crate::ingest::structured::{extract_structured, StructuredExtractor};
use crate::ingest::IngestError;

/// Outcome of a completed run. `persisted` is false when the best-effort save failed.
#[derive(Debug, Clone)]
pub struct ProcessedResume {
    pub record: ResumeRecord,
    pub persisted: bool,
}

#[derive(Clone)]
pub struct ResumePipeline {
    http: Client,
    extractor: Arc<dyn StructuredExtractor>,
    store: Arc<dyn ResumeStore>,
    limits: IngestLimits,
}

impl ResumePipeline {
    pub fn new(
        http: Client,
        extractor: Arc<dyn StructuredExtractor>,
        store: Arc<dyn ResumeStore>,
        limits: IngestLimits,
    ) -> Self {
        Self {
            http,
            extractor,
            store,
            limits,
        }
    }

    pub fn store(&self) -> &dyn ResumeStore {
        self.store.as_ref()
    }

    pub fn limits(&self) -> &IngestLimits {
        &self.limits
    }

    pub async fn process(
        &self,
        user_id: &str,
        resume_url: &str,
    ) -> Result<ProcessedResume, IngestError> {
        let span = info_span!("resume_pipeline", user_id);
        self.run(user_id, resume_url).instrument(span).await
    }

    async fn run(&self, user_id: &str, resume_url: &str) -> Result<ProcessedResume, IngestError> {
        // Fetching
        let doc = fetch_document(
            &self.http,
            resume_url,
            self.limits.fetch_timeout,
            self.limits.max_file_bytes,
        )
        .await?;
        info!(size = doc.size(), content_type = %doc.content_type, "Resume fetched");

        // Extracting
        let file_metadata = FileMetadata {
            size: doc.size(),
            content_type: doc.content_type.clone(),
        };
        let now = Utc::now();
        let text = tokio::task::spawn_blocking(move || extract_text(&doc, now))
            .await
            .map_err(|e| IngestError::Extraction(format!("decoder task failed: {e}")))??;
        if !is_long_enough(&text) {
            return Err(IngestError::Unextractable);
        }
        info!(chars = text.chars().count(), "Resume text extracted");

        // Sanitizing
        let sanitized = sanitize(&text, self.limits.max_text_chars);
        info!(
            chars = sanitized.text.chars().count(),
            readability = sanitized.readability,
            readable = sanitized.readable,
            "Resume text sanitized"
        );

        // StructuredExtraction
        let structured = extract_structured(self.extractor.as_ref(), &sanitized.text).await;

        // Persisting
        let record = ResumeRecord {
            extracted_data: structured.fields,
            user_summary: structured.summary,
            processed_at: Utc::now(),
            file_metadata,
        };
        let persisted = match self.store.save(user_id, &record).await {
            Ok(()) => {
                info!(persisted = true, "Resume record saved");
                true
            }
            Err(e) => {
                error!(persisted = false, error = %e, "Failed to save resume record");
                false
            }
        };

        Ok(ProcessedResume { record, persisted })
    }
}
