//! Test embedders. Deterministic, offline, and instrumented with call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::{Embedder, EmbeddingError};

pub const STUB_DIM: usize = 32;

/// Bag-of-words embedder: each lowercase token is hashed into one of `STUB_DIM` buckets.
/// Identical strings always produce identical vectors.
#[derive(Default)]
pub struct StubEmbedder {
    calls: AtomicUsize,
    overrides: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the vector returned for an exact input string.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.overrides.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.overrides.get(text) {
            return v.clone();
        }
        let mut v = vec![0.0_f32; STUB_DIM];
        for token in text.split_whitespace() {
            v[bucket(&token.to_lowercase())] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Always fails, as an unreachable backend would.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 401,
            message: "Invalid credentials in Authorization header".to_string(),
        })
    }
}

/// Drops the last vector of every batch, violating the same-length contract.
pub struct TruncatingEmbedder;

#[async_trait]
impl Embedder for TruncatingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let keep = texts.len().saturating_sub(1);
        Ok(vec![vec![1.0; STUB_DIM]; keep])
    }
}

fn bucket(token: &str) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % STUB_DIM as u64) as usize
}
