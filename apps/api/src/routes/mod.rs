pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::feedback::handlers as feedback;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session input
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/submit",
            post(session::handle_submit).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Feedback runs
        .route(
            "/api/v1/sessions/:id/jd-match",
            post(feedback::handle_jd_match),
        )
        .route(
            "/api/v1/sessions/:id/resume-feedback",
            post(feedback::handle_resume_feedback),
        )
        .route("/api/v1/sessions/:id/report", get(session::handle_report))
        .with_state(state)
}
