//! Sentence embeddings — turns answer text into fixed-size vectors for similarity scoring.
//!
//! `AppState` carries an `Arc<dyn Embedder>`. In production that is a [`LazyEmbedder`]
//! wrapping the HuggingFace feature-extraction backend; tests use the stub in [`mock`].

use async_trait::async_trait;
use thiserror::Error;

pub mod hf;
#[cfg(test)]
pub mod mock;
pub mod provider;

pub use provider::LazyEmbedder;

/// Sentence-transformers model used for answer similarity.
pub const EMBEDDING_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";

pub const DEFAULT_EMBEDDING_URL: &str = "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-mpnet-base-v2/pipeline/feature-extraction";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("embedding backend returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("embedding dimension changed from {expected} to {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding backend failed to initialize: {0}")]
    Init(String),
}

/// Converts text into same-length, same-order embedding vectors.
///
/// Implementations must return exactly one vector per input and must never
/// substitute zero vectors for a failed call.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
