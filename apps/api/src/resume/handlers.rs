use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::InterviewRow;
use crate::resume::analysis::{analyze_resume, AnalysisResult};
use crate::resume::extract::{extract_text, DocumentKind};
use crate::resume::repository::{archive_resume, get_interview, insert_interview};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct AnalyzeResumeResponse {
    pub message: String,
    pub interview_id: Uuid,
    pub data: AnalysisResult,
    pub parse_error: Option<String>,
}

struct Upload {
    filename: String,
    data: Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read upload: {e}")))?;
        return Ok(Upload { filename, data });
    }
    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// POST /analyze-resume/
///
/// Extracts resume text, generates the question bank, stores the analysis and
/// archives the original upload.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResumeResponse>, AppError> {
    if !state.llm.is_configured() {
        return Err(AppError::Config("HF_API_KEY not set".to_string()));
    }

    let upload = read_upload(&mut multipart).await?;
    let kind = DocumentKind::from_filename(&upload.filename)
        .ok_or_else(|| AppError::BadRequest("Only PDF and DOCX supported".to_string()))?;

    let resume_text = match extract_text(kind, upload.data.clone()).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction failed for {}: {e}", upload.filename);
            String::new()
        }
    };
    if resume_text.trim().is_empty() {
        return Err(AppError::BadRequest("Could not extract text".to_string()));
    }

    let analysis = analyze_resume(&state.llm, &resume_text).await?;

    let interview_id = Uuid::new_v4();
    let s3_key = match archive_resume(
        &state.s3,
        &state.config.s3_bucket,
        interview_id,
        &upload.filename,
        kind,
        upload.data,
    )
    .await
    {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("Resume archival skipped for {interview_id}: {e}");
            None
        }
    };

    insert_interview(&state.db, interview_id, &resume_text, &analysis, s3_key.as_deref()).await?;

    info!(
        "Resume {} analyzed as interview {interview_id} (parse_error: {})",
        upload.filename,
        analysis.parse_error.is_some()
    );

    Ok(Json(AnalyzeResumeResponse {
        message: "Resume analyzed and saved successfully".to_string(),
        interview_id,
        data: analysis.result,
        parse_error: analysis.parse_error,
    }))
}

/// GET /interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewRow>, AppError> {
    let interview = get_interview(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(Json(interview))
}
