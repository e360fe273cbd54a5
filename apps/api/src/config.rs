use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Overrides the generation endpoint (self-hosted gateways, local mocks).
    pub llm_api_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub ingest: IngestLimits,
}

/// Bounds applied by the resume ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestLimits {
    pub fetch_timeout: Duration,
    pub max_file_bytes: usize,
    pub max_text_chars: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_file_bytes: 10 * 1024 * 1024,
            max_text_chars: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = IngestLimits::default();
        let ingest = IngestLimits {
            fetch_timeout: optional_env::<u64>("RESUME_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            max_file_bytes: optional_env("RESUME_MAX_BYTES")?.unwrap_or(defaults.max_file_bytes),
            max_text_chars: optional_env("RESUME_MAX_TEXT_CHARS")?
                .unwrap_or(defaults.max_text_chars),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: std::env::var("LLM_API_URL").ok().filter(|s| !s.is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ingest,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        _ => Ok(None),
    }
}
