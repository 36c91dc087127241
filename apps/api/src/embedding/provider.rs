use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::embedding::hf::{HfEmbedder, HfEmbedderConfig};
use crate::embedding::{Embedder, EmbeddingError};

/// Builds the real embedding backend. Called at most once per [`LazyEmbedder`].
#[async_trait]
pub trait EmbedderFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn Embedder>, EmbeddingError>;
}

#[async_trait]
impl EmbedderFactory for HfEmbedderConfig {
    async fn build(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        Ok(Arc::new(HfEmbedder::connect(self.clone()).await?))
    }
}

/// Process-wide embedding handle with deferred initialization.
///
/// Created during startup and shared through `AppState`. The backend is built on
/// the first non-empty `embed` call; concurrent first callers wait on the same
/// initializer. A failed build leaves the cell empty so a later request can retry.
pub struct LazyEmbedder {
    factory: Box<dyn EmbedderFactory>,
    backend: OnceCell<Arc<dyn Embedder>>,
}

impl LazyEmbedder {
    pub fn new(factory: impl EmbedderFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            backend: OnceCell::new(),
        }
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    async fn backend(&self) -> Result<&Arc<dyn Embedder>, EmbeddingError> {
        self.backend
            .get_or_try_init(|| async {
                info!("Initializing embedding backend");
                self.factory.build().await
            })
            .await
    }
}

#[async_trait]
impl Embedder for LazyEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.backend().await?.embed(texts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::mock::StubEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingFactory {
        builds: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl EmbedderFactory for CountingFactory {
        async fn build(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(EmbeddingError::Init("backend unreachable".to_string()));
            }
            Ok(Arc::new(StubEmbedder::new()))
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_initialize() {
        let builds = Arc::new(AtomicUsize::new(0));
        let embedder = LazyEmbedder::new(CountingFactory {
            builds: builds.clone(),
            fail: false,
        });

        let out = embedder.embed(&[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert!(!embedder.is_initialized());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_builds_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let embedder = Arc::new(LazyEmbedder::new(CountingFactory {
            builds: builds.clone(),
            fail: false,
        }));

        let mut handles = Vec::new();
        for i in 0..8 {
            let embedder = embedder.clone();
            handles.push(tokio::spawn(async move {
                embedder.embed(&[format!("answer {i}")]).await
            }));
        }
        for handle in handles {
            let vectors = handle.await.unwrap().unwrap();
            assert_eq!(vectors.len(), 1);
        }

        embedder.embed(&texts(&["again"])).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(embedder.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_build_propagates_and_allows_retry() {
        let builds = Arc::new(AtomicUsize::new(0));
        let embedder = LazyEmbedder::new(CountingFactory {
            builds: builds.clone(),
            fail: true,
        });

        let err = embedder.embed(&texts(&["a"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Init(_)));
        assert!(!embedder.is_initialized());

        let _ = embedder.embed(&texts(&["a"])).await;
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
