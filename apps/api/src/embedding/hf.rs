//! HuggingFace inference backend (feature-extraction pipeline).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::embedding::{Embedder, EmbeddingError, EMBEDDING_MODEL};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const WARMUP_TEXT: &str = "warmup";

#[derive(Debug, Clone)]
pub struct HfEmbedderConfig {
    pub url: String,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Remote sentence-transformers embedder.
///
/// Built through [`HfEmbedder::connect`], which issues one warmup call so the
/// hosted model is loaded and the vector dimension is known before real traffic.
#[derive(Debug)]
pub struct HfEmbedder {
    client: Client,
    config: HfEmbedderConfig,
    dimension: usize,
}

impl HfEmbedder {
    pub async fn connect(config: HfEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let warmup = request_embeddings(&client, &config, &[WARMUP_TEXT.to_string()]).await?;
        let dimension = warmup
            .first()
            .map(Vec::len)
            .filter(|d| *d > 0)
            .ok_or_else(|| EmbeddingError::Init("warmup returned no vector".to_string()))?;

        info!(model = EMBEDDING_MODEL, dimension, "Embedding backend ready");

        Ok(Self {
            client,
            config,
            dimension,
        })
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let vectors = request_embeddings(&self.client, &self.config, texts).await?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: bad.len(),
            });
        }

        debug!(count = vectors.len(), "Embedded batch");
        Ok(vectors)
    }
}

async fn request_embeddings(
    client: &Client,
    config: &HfEmbedderConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut request = client
        .post(&config.url)
        .json(&FeatureExtractionRequest { inputs: texts });
    if let Some(token) = &config.token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(EmbeddingError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    parse_embeddings(&body)
}

/// Parses a feature-extraction response body: one vector per input.
fn parse_embeddings(body: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    serde_json::from_str::<Vec<Vec<f32>>>(body)
        .map_err(|e| EmbeddingError::Malformed(format!("{e}: {}", truncate(body, 200))))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
