//! Structured Extraction — two sequential LLM calls (resume fields, then narrative summary).
//!
//! Each call is single-shot. On any failure the static fallback from
//! `ingest::models` is substituted and the failure is only logged.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::ingest::models::{ResumeFields, UserSummary};
use crate::ingest::prompts::{
    RESUME_FIELDS_PROMPT, RESUME_FIELDS_SYSTEM, USER_SUMMARY_PROMPT, USER_SUMMARY_SYSTEM,
};
use crate::llm_client::{CallOptions, LlmClient, LlmError};

const FIELDS_MAX_TOKENS: u32 = 2000;
const FIELDS_TEMPERATURE: f32 = 0.1;
const SUMMARY_MAX_TOKENS: u32 = 500;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Backend for the two extraction calls. Carried in `AppState` as `Arc<dyn StructuredExtractor>`.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract_fields(&self, resume_text: &str) -> Result<ResumeFields, LlmError>;

    async fn summarize(&self, fields: &ResumeFields) -> Result<UserSummary, LlmError>;
}

/// Claude-backed extractor.
pub struct LlmStructuredExtractor(pub LlmClient);

#[async_trait]
impl StructuredExtractor for LlmStructuredExtractor {
    async fn extract_fields(&self, resume_text: &str) -> Result<ResumeFields, LlmError> {
        let prompt = RESUME_FIELDS_PROMPT.replace("{resume_text}", resume_text);
        self.0
            .call_json(
                &prompt,
                RESUME_FIELDS_SYSTEM,
                &CallOptions::single_shot(FIELDS_MAX_TOKENS, FIELDS_TEMPERATURE),
            )
            .await
    }

    async fn summarize(&self, fields: &ResumeFields) -> Result<UserSummary, LlmError> {
        let resume_json = serde_json::to_string_pretty(fields)?;
        let prompt = USER_SUMMARY_PROMPT.replace("{resume_json}", &resume_json);
        self.0
            .call_json(
                &prompt,
                USER_SUMMARY_SYSTEM,
                &CallOptions::single_shot(SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE),
            )
            .await
    }
}

/// Result of both extraction steps, with which ones fell back to defaults.
#[derive(Debug, Clone)]
pub struct StructuredResult {
    pub fields: ResumeFields,
    pub summary: UserSummary,
    pub fields_fallback: bool,
    pub summary_fallback: bool,
}

/// Runs both extraction steps in order. Never fails.
pub async fn extract_structured(
    extractor: &dyn StructuredExtractor,
    resume_text: &str,
) -> StructuredResult {
    let (fields, fields_fallback) = match extractor.extract_fields(resume_text).await {
        Ok(fields) => (fields, false),
        Err(e) => {
            warn!(error = %e, "Resume field extraction failed, using fallback");
            (ResumeFields::fallback(), true)
        }
    };

    let (mut summary, summary_fallback) = match extractor.summarize(&fields).await {
        Ok(summary) => (summary, false),
        Err(e) => {
            warn!(error = %e, "Profile summary generation failed, using fallback");
            (UserSummary::fallback_for(&fields), true)
        }
    };
    summary.key_strengths.truncate(UserSummary::MAX_KEY_STRENGTHS);

    info!(
        skills = fields.skills.len(),
        experience = fields.experience.len(),
        fields_fallback,
        summary_fallback,
        "Structured extraction complete"
    );

    StructuredResult {
        fields,
        summary,
        fields_fallback,
        summary_fallback,
    }
}
