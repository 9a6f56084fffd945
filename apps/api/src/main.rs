mod config;
mod embedding;
mod errors;
mod extraction;
mod feedback;
mod llm_client;
mod models;
mod report;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::embedding::{Embedder, RemoteEmbedder};
use crate::extraction::PdfTextExtractor;
use crate::feedback::pipeline::{FeedbackPipeline, GenerationLimits};
use crate::llm_client::HfInferenceClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing inference credential)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume matcher v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(config.llm_timeout_secs);

    // Initialize text generation client
    let llm = HfInferenceClient::new(
        &config.hf_api_base,
        &config.hf_model,
        config.hf_api_key.clone(),
        timeout,
    )?;
    info!("LLM client initialized (endpoint: {})", llm.endpoint());

    // Initialize embedder (local fastembed by default — swap via EMBEDDING_BACKEND)
    let embedder: Arc<dyn Embedder> = match config.embedding_backend {
        EmbeddingBackend::Local => load_local_embedder().await?,
        EmbeddingBackend::Remote => Arc::new(RemoteEmbedder::new(
            &config.hf_api_base,
            &config.embedding_model,
            config.hf_api_key.clone(),
            timeout,
        )?),
    };
    info!("Embedder initialized (model: {})", embedder.model_name());

    let limits = GenerationLimits {
        max_input_words: config.max_input_words,
        ..GenerationLimits::default()
    };
    info!(
        "Prompt budget: {} words, output {}/{} tokens",
        limits.max_input_words, limits.extraction_max_new_tokens, limits.feedback_max_new_tokens
    );

    let session_ttl = chrono::Duration::from_std(Duration::from_secs(config.session_ttl_secs))?;
    let sessions = SessionStore::with_ttl(session_ttl);
    sessions.spawn_sweeper(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
    info!("Sessions expire after {}s idle", config.session_ttl_secs);

    // Build app state
    let state = AppState {
        pipeline: FeedbackPipeline::new(Arc::new(llm), embedder, limits),
        pdf: PdfTextExtractor,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the in-process model on the blocking pool; the first run downloads it.
#[cfg(feature = "local-embeddings")]
async fn load_local_embedder() -> Result<Arc<dyn Embedder>> {
    let embedder = tokio::task::spawn_blocking(embedding::LocalEmbedder::load).await??;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local-embeddings"))]
async fn load_local_embedder() -> Result<Arc<dyn Embedder>> {
    anyhow::bail!(
        "EMBEDDING_BACKEND=local requires the 'local-embeddings' feature; \
         rebuild with it or set EMBEDDING_BACKEND=remote"
    )
}
