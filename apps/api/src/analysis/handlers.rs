//! Axum route handlers for the analysis session API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::analysis::session::{Session, StateKind};
use crate::errors::AppError;
use crate::models::record::SubmissionForm;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: StateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl SessionResponse {
    fn from_session(session: &Session) -> Self {
        let state = session.state();
        let outcome = state.outcome();
        Self {
            session_id: session.id(),
            state: session.kind(),
            resume_text: state.submission().map(|s| s.resume_text.clone()),
            analysis: outcome.map(|o| o.analysis.clone()),
            record_id: outcome.map(|o| o.record_id),
            persisted: outcome.map(|o| o.persisted),
            download_url: outcome
                .map(|_| format!("/api/v1/sessions/{}/analysis.txt", session.id())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// One action per session at a time; a second concurrent action is refused.
fn lock_session(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, AppError> {
    session.try_lock().map_err(|_| AppError::SessionBusy)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let id = state.sessions.create().await;
    let session = find_session(&state, id).await?;
    let session = lock_session(&session)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::from_session(&session)),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let session = lock_session(&session)?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart form with the candidate fields, `job_description` and a `resume` PDF.
/// Extracts the résumé text and moves the session to `ExtractedText`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, id).await?;

    let mut form = SubmissionForm::default();
    let mut pdf: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => pdf = Some(field.bytes().await?),
            "name" => form.name = field.text().await?,
            "email" => form.email = field.text().await?,
            "linkedin_profile" => form.linkedin_profile = field.text().await?,
            "preferred_job_role" => form.preferred_job_role = field.text().await?,
            "job_description" => form.job_description = field.text().await?,
            _ => {}
        }
    }

    let mut session = lock_session(&session)?;
    session.accept_input(form, pdf.as_deref(), state.extractor.as_ref())?;
    info!("Session {id}: resume text extracted");

    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/sessions/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = lock_session(&session)?;

    state.analyzer.run(&mut session).await?;

    Ok(Json(SessionResponse::from_session(&session)))
}

/// GET /api/v1/sessions/:id/analysis.txt
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, id).await?;
    let download = lock_session(&session)?.download()?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.file_name),
            ),
        ],
        download.body,
    ))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = lock_session(&session)?;
    session.reset();
    Ok(Json(SessionResponse::from_session(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}
