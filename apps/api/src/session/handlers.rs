//! Axum route handlers for session input and results.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::PdfTextExtractor;
use crate::models::document::{DocumentSource, DocumentText};
use crate::report::render_session_report;
use crate::session::{Session, MISSING_JD_ON_SUBMIT_WARNING, MISSING_RESUME_ON_SUBMIT_WARNING};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    pub resume_received: bool,
    pub jd_received: bool,
    pub warnings: Vec<String>,
}

/// Raw multipart input before file/text precedence is applied.
#[derive(Debug, Default)]
struct SubmittedInputs {
    resume_file: Option<Bytes>,
    jd_file: Option<Bytes>,
    resume_text: Option<String>,
    jd_text: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = state.sessions.create().await;
    info!("Created session {}", session.id);
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(session_not_found(id));
    }
    info!("Deleted session {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/submit
///
/// Multipart fields: `resume_file`, `jd_file` (PDF), `resume_text`, `jd_text`.
/// An uploaded file wins over pasted text for the same document. Inputs that
/// resolve to nothing leave the previously stored value untouched.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    load_session(&state, id).await?;

    let inputs = read_inputs(multipart).await?;
    let resume = resolve_document(&state.pdf, inputs.resume_file, inputs.resume_text).await?;
    let jd = resolve_document(&state.pdf, inputs.jd_file, inputs.jd_text).await?;

    let mut warnings = Vec::new();
    if resume.is_none() {
        warnings.push(MISSING_RESUME_ON_SUBMIT_WARNING.to_string());
    }
    if jd.is_none() {
        warnings.push(MISSING_JD_ON_SUBMIT_WARNING.to_string());
    }

    let resume_received = resume.is_some();
    let jd_received = jd.is_some();

    state
        .sessions
        .update(id, |session| {
            if let Some(resume) = resume {
                session.resume = Some(resume);
            }
            if let Some(jd) = jd {
                session.jd = Some(jd);
            }
        })
        .await
        .ok_or_else(|| session_not_found(id))?;

    info!("Session {id}: submit resume={resume_received} jd={jd_received}");

    Ok(Json(SubmitResponse {
        session_id: id,
        resume_received,
        jd_received,
        warnings,
    }))
}

/// GET /api/v1/sessions/:id/report
///
/// Markdown rendering of everything computed for the session so far.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = load_session(&state, id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_session_report(&session),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) async fn load_session(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

pub(crate) fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

async fn read_inputs(mut multipart: Multipart) -> Result<SubmittedInputs, AppError> {
    let mut inputs = SubmittedInputs::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;

        match name.as_str() {
            // Browsers send an empty part for an untouched file input
            "resume_file" if !data.is_empty() => inputs.resume_file = Some(data),
            "jd_file" if !data.is_empty() => inputs.jd_file = Some(data),
            "resume_text" => inputs.resume_text = Some(bytes_to_text(&name, &data)?),
            "jd_text" => inputs.jd_text = Some(bytes_to_text(&name, &data)?),
            _ => {}
        }
    }

    Ok(inputs)
}

fn bytes_to_text(name: &str, data: &[u8]) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation(format!("Field '{name}' is not valid UTF-8")))
}

/// File upload takes precedence; pasted text is trimmed. Empty results count
/// as not provided.
async fn resolve_document(
    pdf: &PdfTextExtractor,
    file: Option<Bytes>,
    pasted: Option<String>,
) -> Result<Option<DocumentText>, AppError> {
    let (content, source) = match file {
        Some(bytes) => (pdf.extract_async(bytes).await?, DocumentSource::PdfUpload),
        None => (
            pasted.map(|t| t.trim().to_string()).unwrap_or_default(),
            DocumentSource::PastedText,
        ),
    };

    if content.is_empty() {
        return Ok(None);
    }
    Ok(Some(DocumentText::new(content, source)))
}
