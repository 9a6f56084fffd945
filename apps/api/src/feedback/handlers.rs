//! Axum route handlers for the feedback runs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feedback::{FeedbackText, MatchReport};
use crate::session::handlers::{load_session, session_not_found};
use crate::session::{MISSING_BOTH_WARNING, MISSING_RESUME_WARNING};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JdMatchResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub report: MatchReport,
    pub match_percentage: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct ResumeFeedbackResponse {
    pub session_id: Uuid,
    pub ats_feedback: FeedbackText,
}

/// POST /api/v1/sessions/:id/jd-match
///
/// Extract relevant JD → similarity → feedback. Results are stored on the
/// session; the session lock is not held while the models run.
pub async fn handle_jd_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JdMatchResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let (resume, jd) = match (session.resume, session.jd) {
        (Some(resume), Some(jd)) => (resume, jd),
        _ => return Err(AppError::Validation(MISSING_BOTH_WARNING.to_string())),
    };

    info!(
        "Session {id}: JD matching (resume {} words, JD {} words)",
        resume.word_count, jd.word_count
    );
    let report = state
        .pipeline
        .match_against_job(resume.as_str(), jd.as_str())
        .await?;

    state
        .sessions
        .update(id, |s| s.record_match(report.clone()))
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(JdMatchResponse {
        session_id: id,
        match_percentage: report.match_percentage(),
        report,
    }))
}

/// POST /api/v1/sessions/:id/resume-feedback
pub async fn handle_resume_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeFeedbackResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let resume = session
        .resume
        .ok_or_else(|| AppError::Validation(MISSING_RESUME_WARNING.to_string()))?;

    info!("Session {id}: ATS feedback ({} words)", resume.word_count);
    let feedback = state.pipeline.standalone_feedback(resume.as_str()).await?;

    state
        .sessions
        .update(id, |s| s.ats_feedback = Some(feedback.clone()))
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(ResumeFeedbackResponse {
        session_id: id,
        ats_feedback: feedback,
    }))
}
