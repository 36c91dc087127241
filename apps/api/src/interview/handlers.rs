use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::routes::json::AppJson;
use crate::interview::models::{InterviewSessionPayload, SessionMode, SessionSummary};
use crate::interview::session::{evaluate_session, get_session, insert_session, SessionDocument};
use crate::models::interview::InterviewSessionRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompleteSessionResponse {
    pub message: String,
    pub session_id: Uuid,
    pub session_mode: SessionMode,
    pub summary: SessionSummary,
}

/// POST /interview/session/complete
///
/// Scores the submitted answers, classifies the session, and stores it.
pub async fn handle_complete_session(
    State(state): State<AppState>,
    AppJson(payload): AppJson<InterviewSessionPayload>,
) -> Result<Json<CompleteSessionResponse>, AppError> {
    payload.validate()?;

    let summary = evaluate_session(state.embedder.as_ref(), &payload).await?;

    let document = SessionDocument::new(payload, summary);
    let session_id = insert_session(&state.db, &document).await?;

    info!(
        "Session {session_id} completed: quality={:?}, result={:?}",
        document.summary.answer_quality, document.summary.overall_result
    );

    Ok(Json(CompleteSessionResponse {
        message: "Interview session stored".to_string(),
        session_id,
        session_mode: document.session_mode,
        summary: document.summary,
    }))
}

/// GET /interview/session/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSessionRow>, AppError> {
    let session = get_session(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))?;
    Ok(Json(session))
}
