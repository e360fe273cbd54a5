//! Axum route handlers for the resume upload API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::ingest::models::{ResumeFields, ResumeRecord, UserSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub extracted_data: ResumeFields,
    pub user_summary: UserSummary,
    pub message: String,
    /// False when the record could not be saved; the extracted data is still returned.
    pub persisted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    pub supported_formats: Vec<&'static str>,
    pub max_file_size: String,
    pub max_file_size_bytes: usize,
    pub description: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/upload
///
/// Downloads the resume at `resumeUrl`, extracts structured data and stores it on the
/// caller's profile. Returns 200 whenever text extraction succeeded.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let resume_url = request
        .resume_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Resume URL is required".to_string()))?;

    info!(user_id = %user.id, "Processing resume upload");
    let processed = state.pipeline.process(&user.id, resume_url).await?;

    let message = if processed.persisted {
        "Resume processed successfully".to_string()
    } else {
        "Resume processed successfully, but it could not be saved to your profile".to_string()
    };

    Ok(Json(UploadResponse {
        success: true,
        extracted_data: processed.record.extracted_data,
        user_summary: processed.record.user_summary,
        message,
        persisted: processed.persisted,
    }))
}

/// GET /api/v1/resume/upload
///
/// Static description of what the upload endpoint accepts.
pub async fn handle_capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    let max_bytes = state.pipeline.limits().max_file_bytes;
    Json(CapabilitiesResponse {
        supported_formats: vec!["PDF", "DOCX", "TXT"],
        max_file_size: format!("{}MB", max_bytes / (1024 * 1024)),
        max_file_size_bytes: max_bytes,
        description: "Upload a resume by URL to extract skills, experience and a profile summary",
    })
}

/// GET /api/v1/resume
///
/// Returns the caller's stored resume record.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state
        .pipeline
        .store()
        .load(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume on file".to_string()))?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::USER_ID_HEADER;
    use crate::config::IngestLimits;
    use crate::ingest::models::FALLBACK_SUMMARY;
    use crate::ingest::pipeline::ResumePipeline;
    use crate::ingest::store::ResumeStore;
    use crate::ingest::structured::LlmStructuredExtractor;
    use crate::llm_client::{mock_response_body, LlmClient};
    use crate::routes::build_router;
    use crate::state::AppState;

    use super::*;

    const SAMPLE: &str =
        "John Doe, Software Engineer at Acme Corp, 2020-2023. Skills: Python, Go.";

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, ResumeRecord>>);

    #[async_trait]
    impl ResumeStore for MemoryStore {
        async fn save(&self, user_id: &str, record: &ResumeRecord) -> anyhow::Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(user_id.to_string(), record.clone());
            Ok(())
        }

        async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>, sqlx::Error> {
            Ok(self.0.lock().unwrap().get(user_id).cloned())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ResumeStore for BrokenStore {
        async fn save(&self, _: &str, _: &ResumeRecord) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn load(&self, _: &str) -> Result<Option<ResumeRecord>, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }
    }

    fn app(llm: &ServerGuard, store: Arc<dyn ResumeStore>, limits: IngestLimits) -> Router {
        let client = LlmClient::with_base_url("k".into(), format!("{}/v1/messages", llm.url()));
        let pipeline = ResumePipeline::new(
            reqwest::Client::new(),
            Arc::new(LlmStructuredExtractor(client)),
            store,
            limits,
        );
        build_router(AppState { pipeline })
    }

    async fn mock_llm_echoing_skill(server: &mut ServerGuard) -> Vec<Mock> {
        let fields = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("expert resume parser".into()))
            .with_status(200)
            .with_body(mock_response_body(
                r#"{"summary": "Software engineer", "skills": ["Python"], "experience": [{"title": "Software Engineer", "company": "Acme Corp", "duration": "2020-2023", "description": ""}], "education": []}"#,
            ))
            .create_async()
            .await;
        let summary = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("career coach".into()))
            .with_status(200)
            .with_body(mock_response_body(
                r#"{"professionalSummary": "Engineer.", "keyStrengths": ["Python"], "careerFocus": "Backend", "valueProposition": "Builds services."}"#,
            ))
            .create_async()
            .await;
        vec![fields, summary]
    }

    async fn serve_file(
        server: &mut ServerGuard,
        path: &str,
        content_type: &str,
        body: &[u8],
    ) -> (String, Mock) {
        let mock = server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", content_type)
            .with_body(body)
            .create_async()
            .await;
        (format!("{}{}", server.url(), path), mock)
    }

    fn upload(user: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/resume/upload")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_plain_text_resume_end_to_end() {
        let mut llm = mockito::Server::new_async().await;
        let _llm_mocks = mock_llm_echoing_skill(&mut llm).await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/cv.txt", "text/plain", SAMPLE.as_bytes()).await;

        let store = Arc::new(MemoryStore::default());
        let app = app(&llm, store.clone(), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["persisted"], true);
        assert_eq!(body["extractedData"]["skills"][0], "Python");
        assert_eq!(body["userSummary"]["careerFocus"], "Backend");

        let saved = store.load("user_1").await.unwrap().unwrap();
        assert_eq!(saved.extracted_data.skills, vec!["Python"]);
        assert_eq!(saved.file_metadata.size, SAMPLE.len());
        assert_eq!(saved.file_metadata.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_short_text_is_400() {
        let llm = mockito::Server::new_async().await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/cv.txt", "text/plain", &[b'a'; 40]).await;

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Resume appears to be empty or too short"));
    }

    #[tokio::test]
    async fn test_unauthenticated_is_401() {
        let llm = mockito::Server::new_async().await;
        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, _) = send(app, upload(None, serde_json::json!({"resumeUrl": "https://x/cv.pdf"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_url_is_400() {
        let llm = mockito::Server::new_async().await;
        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Resume URL is required");
    }

    #[tokio::test]
    async fn test_download_404_is_400() {
        let llm = mockito::Server::new_async().await;
        let mut files = mockito::Server::new_async().await;
        let _m = files.mock("GET", "/missing.pdf").with_status(404).create_async().await;
        let url = format!("{}/missing.pdf", files.url());

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to download resume file");
    }

    #[tokio::test]
    async fn test_oversized_file_is_400() {
        let llm = mockito::Server::new_async().await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/big.txt", "text/plain", &vec![b'a'; 2 * 1024 * 1024 + 1]).await;

        let limits = IngestLimits {
            max_file_bytes: 2 * 1024 * 1024,
            ..IngestLimits::default()
        };
        let app = app(&llm, Arc::new(MemoryStore::default()), limits);
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SIZE_LIMIT_ERROR");
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_400_not_hang() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let llm = mockito::Server::new_async().await;
        let limits = IngestLimits {
            fetch_timeout: Duration::from_millis(200),
            ..IngestLimits::default()
        };
        let app = app(&llm, Arc::new(MemoryStore::default()), limits);
        let url = format!("http://{addr}/cv.pdf");
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to fetch resume file");
    }

    #[tokio::test]
    async fn test_broken_docx_is_400() {
        let llm = mockito::Server::new_async().await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(
            &mut files,
            "/cv.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            b"this is not a zip archive at all, just some text bytes",
        )
        .await;

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_broken_pdf_is_200_with_fallback_data() {
        // Provider is down: both extraction steps fall back.
        let mut llm = mockito::Server::new_async().await;
        let _m = llm.mock("POST", "/v1/messages").with_status(500).create_async().await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/cv.pdf", "application/pdf", b"%PDF-1.4 truncated").await;

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["extractedData"]["summary"], FALLBACK_SUMMARY);
        assert_eq!(body["extractedData"]["skills"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_persistence_failure_still_200() {
        let mut llm = mockito::Server::new_async().await;
        let _llm_mocks = mock_llm_echoing_skill(&mut llm).await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/cv.txt", "text/plain", SAMPLE.as_bytes()).await;

        let app = app(&llm, Arc::new(BrokenStore), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["persisted"], false);
        assert_eq!(body["extractedData"]["skills"][0], "Python");
    }

    #[tokio::test]
    async fn test_garbled_text_sends_placeholder_to_provider() {
        let mut llm = mockito::Server::new_async().await;
        let placeholder_mock = llm
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("could not be read reliably".into()))
            .with_status(200)
            .with_body(mock_response_body(r#"{"summary": "Unreadable"}"#))
            .expect(1)
            .create_async()
            .await;
        let mut files = mockito::Server::new_async().await;
        let garbled = "#$%^&*()_+{}|:<>?~`-=[]\\;',./!@".repeat(5);
        let (url, _file) = serve_file(&mut files, "/cv.txt", "text/plain", garbled.as_bytes()).await;

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extractedData"]["summary"], "Unreadable");
        placeholder_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_capabilities() {
        let llm = mockito::Server::new_async().await;
        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let req = Request::builder()
            .uri("/api/v1/resume/upload")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["maxFileSize"], "10MB");
        assert_eq!(body["supportedFormats"], serde_json::json!(["PDF", "DOCX", "TXT"]));
    }

    #[tokio::test]
    async fn test_get_resume_roundtrip_and_404() {
        let mut llm = mockito::Server::new_async().await;
        let _llm_mocks = mock_llm_echoing_skill(&mut llm).await;
        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(&mut files, "/cv.txt", "text/plain", SAMPLE.as_bytes()).await;

        let store = Arc::new(MemoryStore::default());
        let app = app(&llm, store, IngestLimits::default());

        let (status, _) = send(app.clone(), get_resume("user_1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app.clone(), upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, get_resume("user_1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extractedData"]["skills"][0], "Python");
        assert!(body.get("processedAt").is_some());
    }

    fn get_resume(user: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/v1/resume")
            .header(USER_ID_HEADER, user)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_resume_database_failure_is_500() {
        let llm = mockito::Server::new_async().await;
        let app = app(&llm, Arc::new(BrokenStore), IngestLimits::default());
        let (status, body) = send(app, get_resume("user_1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["error"], "Failed to process request");
    }

    #[tokio::test]
    async fn test_table_layout_docx_end_to_end() {
        let mut llm = mockito::Server::new_async().await;
        let fields_mock = llm
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("Senior Software Engineer at Acme Corp".into()))
            .with_status(200)
            .with_body(mock_response_body(r#"{"summary": "Engineer", "skills": ["Rust"]}"#))
            .expect_at_least(1)
            .create_async()
            .await;

        let cell = |text: &str| {
            docx_rs::TableCell::new().add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text)),
            )
        };
        let table = docx_rs::Table::new(vec![docx_rs::TableRow::new(vec![
            cell("Jane Doe"),
            cell("Senior Software Engineer at Acme Corp, 2019-2024. Rust, Go, Kubernetes."),
        ])]);
        let mut packed = std::io::Cursor::new(Vec::new());
        docx_rs::Docx::new()
            .add_table(table)
            .build()
            .pack(&mut packed)
            .unwrap();

        let mut files = mockito::Server::new_async().await;
        let (url, _file) = serve_file(
            &mut files,
            "/cv.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            &packed.into_inner(),
        )
        .await;

        let app = app(&llm, Arc::new(MemoryStore::default()), IngestLimits::default());
        let (status, body) = send(app, upload(Some("user_1"), serde_json::json!({"resumeUrl": url}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extractedData"]["skills"][0], "Rust");
        fields_mock.assert_async().await;
    }
}
