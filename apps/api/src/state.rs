use crate::ingest::pipeline::ResumePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume ingestion pipeline: HTTP fetcher, structured extractor and record store.
    pub pipeline: ResumePipeline,
}
