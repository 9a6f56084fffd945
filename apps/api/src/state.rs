use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::feedback::pipeline::FeedbackPipeline;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation and embedding backends, swapped at startup via config.
    pub pipeline: FeedbackPipeline,
    pub pdf: PdfTextExtractor,
    pub sessions: SessionStore,
    pub config: Config,
}
