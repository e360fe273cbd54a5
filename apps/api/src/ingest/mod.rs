// Resume ingestion: fetch → detect format → extract text → sanitize →
// structured extraction → best-effort persistence.
// Failures before text extraction completes are fatal to the request;
// everything after degrades to defaults.

pub mod extractor;
pub mod fetcher;
pub mod format;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod sanitizer;
pub mod store;
pub mod structured;

use thiserror::Error;

pub const TOO_SHORT_MESSAGE: &str =
    "Resume appears to be empty or too short. Please upload a complete resume.";

/// Request-fatal ingestion failures. All surface as HTTP 400.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to fetch resume file")]
    Fetch(#[source] reqwest::Error),

    #[error("Failed to download resume file")]
    Download { status: u16 },

    #[error("File size exceeds the {limit_mb}MB limit")]
    SizeLimit { size: usize, limit_mb: usize },

    #[error("Failed to extract text from resume: {0}")]
    Extraction(String),

    #[error("{}", TOO_SHORT_MESSAGE)]
    Unextractable,
}

impl IngestError {
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Fetch(_) => "FETCH_ERROR",
            IngestError::Download { .. } => "DOWNLOAD_ERROR",
            IngestError::SizeLimit { .. } => "SIZE_LIMIT_ERROR",
            IngestError::Extraction(_) => "EXTRACTION_ERROR",
            IngestError::Unextractable => "UNEXTRACTABLE_ERROR",
        }
    }
}
