use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;

/// Whether 500 responses carry the underlying error text. Set once at startup.
static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

pub fn set_expose_internal_details(expose: bool) {
    let _ = EXPOSE_DETAILS.set(expose);
}

fn expose_internal_details() -> bool {
    *EXPOSE_DETAILS.get().unwrap_or(&true)
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Request-fatal failure before text extraction completed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            AppError::Ingest(e) => {
                tracing::warn!(code = e.code(), "Resume ingestion rejected: {e:?}");
                (StatusCode::BAD_REQUEST, e.code(), e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                return internal_response("DATABASE_ERROR", e.to_string());
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                return internal_response("INTERNAL_ERROR", format!("{e:#}"));
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

fn internal_response(code: &str, details: String) -> Response {
    let body = internal_body(code, details, expose_internal_details());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn internal_body(code: &str, details: String, expose: bool) -> serde_json::Value {
    let mut body = json!({
        "error": "Failed to process request",
        "code": code,
    });
    if expose {
        body["details"] = json!(details);
    }
    body
}
