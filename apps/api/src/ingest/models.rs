use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary used when structured extraction is unavailable.
pub const FALLBACK_SUMMARY: &str = "Resume uploaded successfully. Detailed analysis is not available right now; \
    the profile can be completed manually.";

/// Narrative defaults used when the profile summary step fails.
pub const FALLBACK_PROFESSIONAL_SUMMARY: &str = "Experienced professional with a diverse skill set.";
pub const FALLBACK_CAREER_FOCUS: &str = "Career development and growth";
pub const FALLBACK_VALUE_PROPOSITION: &str =
    "Brings relevant skills and experience to new opportunities.";

/// A downloaded resume file. Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    /// Declared `Content-Type` header; empty when the server sent none.
    pub content_type: String,
    pub source_url: String,
}

impl RawDocument {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Sanitized text forwarded to structured extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub readability: f64,
    pub readable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

/// Structured resume fields. List fields default to empty so they are never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub achievements: Vec<String>,
    pub interests: Vec<String>,
}

impl ResumeFields {
    /// Default object substituted when resume-field extraction fails.
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            ..Self::default()
        }
    }
}

/// Narrative profile summary built from the structured fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSummary {
    pub professional_summary: String,
    pub key_strengths: Vec<String>,
    pub career_focus: String,
    pub value_proposition: String,
}

impl UserSummary {
    pub const MAX_KEY_STRENGTHS: usize = 5;

    /// Default object substituted when narrative extraction fails.
    /// Key strengths are the first five extracted skills.
    pub fn fallback_for(fields: &ResumeFields) -> Self {
        Self {
            professional_summary: FALLBACK_PROFESSIONAL_SUMMARY.to_string(),
            key_strengths: fields
                .skills
                .iter()
                .take(Self::MAX_KEY_STRENGTHS)
                .cloned()
                .collect(),
            career_focus: FALLBACK_CAREER_FOCUS.to_string(),
            value_proposition: FALLBACK_VALUE_PROPOSITION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// The persisted resume, one per user, overwritten on each upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub extracted_data: ResumeFields,
    pub user_summary: UserSummary,
    pub processed_at: DateTime<Utc>,
    pub file_metadata: FileMetadata,
}
