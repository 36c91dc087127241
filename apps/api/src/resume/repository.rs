use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::InterviewRow;
use crate::resume::analysis::ResumeAnalysis;
use crate::resume::extract::DocumentKind;

/// Object key for an archived upload. Path separators in the client-supplied
/// filename are flattened so the key stays under the interview's prefix.
pub fn resume_object_key(interview_id: Uuid, filename: &str) -> String {
    let name: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("resumes/{interview_id}/{name}")
}

/// Uploads the raw resume and returns its object key.
pub async fn archive_resume(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    interview_id: Uuid,
    filename: &str,
    kind: DocumentKind,
    data: Bytes,
) -> Result<String, AppError> {
    let key = resume_object_key(interview_id, filename);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(data))
        .content_type(kind.content_type())
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Archived resume to s3://{bucket}/{key}");
    Ok(key)
}

pub async fn insert_interview(
    pool: &PgPool,
    id: Uuid,
    resume_text: &str,
    analysis: &ResumeAnalysis,
    resume_s3_key: Option<&str>,
) -> Result<(), sqlx::Error> {
    let result = &analysis.result;
    sqlx::query(
        r#"
        INSERT INTO interviews
            (id, extracted_information, interview_questions, group_discussion,
             resume_text, llm_raw_output, llm_parse_error, resume_s3_key, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(Json(&result.extracted_information))
    .bind(Json(&result.interview_questions))
    .bind(Json(&result.group_discussion))
    .bind(resume_text)
    .bind(&analysis.raw_output)
    .bind(analysis.parse_error.as_deref())
    .bind(resume_s3_key)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    info!("Stored resume analysis {id}");
    Ok(())
}

pub async fn get_interview(pool: &PgPool, id: Uuid) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
