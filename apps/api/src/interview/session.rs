use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::interview::models::{
    FaceMetrics, InterviewSessionPayload, QuestionAnswer, SessionMode, SessionSummary,
};
use crate::interview::outcome::classify_outcome;
use crate::interview::scoring::{score_answers, ScoringError};
use crate::models::interview::InterviewSessionRow;

/// Everything stored for a completed session.
#[derive(Debug, Clone)]
pub struct SessionDocument {
    pub session_mode: SessionMode,
    pub candidate_email: Option<String>,
    pub candidate_name: Option<String>,
    pub answers: Vec<QuestionAnswer>,
    pub face_metrics: FaceMetrics,
    pub summary: SessionSummary,
    pub created_at: DateTime<Utc>,
}

/// Scores the answers and classifies the session. No I/O beyond the embedder.
pub async fn evaluate_session(
    embedder: &dyn Embedder,
    payload: &InterviewSessionPayload,
) -> Result<SessionSummary, ScoringError> {
    let scoring = score_answers(embedder, &payload.answers).await?;
    let metrics = &payload.face_metrics;

    Ok(SessionSummary {
        answer_quality: scoring.quality,
        overall_result: classify_outcome(
            metrics.confidence_level,
            metrics.nervousness_level,
            scoring.quality,
        ),
        question_scores: scoring.question_scores,
        average_answer_score: scoring.average_score,
        completion_rate: scoring.completion_rate,
        confidence_level: metrics.confidence_level,
        nervousness_level: metrics.nervousness_level,
    })
}

impl SessionDocument {
    pub fn new(payload: InterviewSessionPayload, summary: SessionSummary) -> Self {
        Self {
            session_mode: payload.session_mode.unwrap_or_default(),
            candidate_email: payload.candidate_email,
            candidate_name: payload.candidate_name,
            answers: payload.answers,
            face_metrics: payload.face_metrics,
            summary,
            created_at: Utc::now(),
        }
    }
}

/// Inserts a session document and returns its id.
pub async fn insert_session(pool: &PgPool, doc: &SessionDocument) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO interview_sessions
            (id, session_mode, candidate_email, candidate_name,
             answers, face_metrics, summary, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(doc.session_mode.as_str())
    .bind(doc.candidate_email.as_deref())
    .bind(doc.candidate_name.as_deref())
    .bind(Json(&doc.answers))
    .bind(Json(&doc.face_metrics))
    .bind(Json(&doc.summary))
    .bind(doc.created_at)
    .execute(pool)
    .await?;

    info!(
        "Stored interview session {id} ({} answers, {:?})",
        doc.answers.len(),
        doc.summary.overall_result
    );
    Ok(id)
}

pub async fn get_session(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<InterviewSessionRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewSessionRow>("SELECT * FROM interview_sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
