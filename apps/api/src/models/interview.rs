use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume analysis with its generated question bank.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub extracted_information: Value,
    pub interview_questions: Value,
    pub group_discussion: Value,
    pub resume_text: String,
    pub llm_raw_output: String,
    pub llm_parse_error: Option<String>,
    pub resume_s3_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub session_mode: String,
    pub candidate_email: Option<String>,
    pub candidate_name: Option<String>,
    pub answers: Value,
    pub face_metrics: Value,
    pub summary: Value,
    pub created_at: DateTime<Utc>,
}
