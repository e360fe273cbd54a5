mod auth;
mod config;
mod db;
mod errors;
mod ingest;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::pipeline::ResumePipeline;
use crate::ingest::store::PgResumeStore;
use crate::ingest::structured::LlmStructuredExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Milo API v{}", env!("CARGO_PKG_VERSION"));
    errors::set_expose_internal_details(!config.is_production());

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = match &config.llm_api_url {
        Some(url) => LlmClient::with_base_url(config.anthropic_api_key.clone(), url.clone()),
        None => LlmClient::new(config.anthropic_api_key.clone()),
    };
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    info!(
        "Resume limits: fetch timeout {:?}, max {} bytes, max {} chars",
        config.ingest.fetch_timeout, config.ingest.max_file_bytes, config.ingest.max_text_chars
    );
    let pipeline = ResumePipeline::new(
        reqwest::Client::new(),
        Arc::new(LlmStructuredExtractor(llm)),
        Arc::new(PgResumeStore::new(db)),
        config.ingest.clone(),
    );

    // Build app state
    let state = AppState { pipeline };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the web app origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
