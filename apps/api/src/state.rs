use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::auth::otp::OtpStore;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// OTP and reset-window records. Redis in production.
    pub otp_store: Arc<dyn OtpStore>,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Sentence-embedding backend for answer scoring. Built lazily on first use.
    pub embedder: Arc<dyn Embedder>,
    pub config: Config,
}
