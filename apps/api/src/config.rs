use anyhow::{Context, Result};

use crate::embedding::DEFAULT_EMBEDDING_URL;

const DEFAULT_SECRET_KEY: &str = "SECRET_KEY_CHANGE_LATER";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Key for the chat-completions router. Resume analysis refuses to run without it.
    pub hf_api_key: Option<String>,
    /// Token for the embedding backend. Falls back through HF_TOKEN, HUGGINGFACE_HUB_TOKEN, HF_API_KEY.
    pub hf_token: Option<String>,
    pub embedding_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let hf_api_key = optional_env("HF_API_KEY");
        let hf_token = optional_env("HF_TOKEN")
            .or_else(|| optional_env("HUGGINGFACE_HUB_TOKEN"))
            .or_else(|| hf_api_key.clone());

        let jwt_secret =
            optional_env("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            hf_api_key,
            hf_token,
            embedding_url: optional_env("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string()),
            jwt_secret,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// True when tokens are being signed with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_SECRET_KEY
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
