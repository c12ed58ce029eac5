use expertsearch_common::{Result, SearchError};
use expertsearch_embed::Embedder;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Turns query text into a query vector using the corpus embedding model
///
/// Holds no per-query state; every call goes to the provider.
#[derive(Clone)]
pub struct QueryEmbedder {
    provider: Arc<dyn Embedder>,
    model: String,
    dimension: Option<usize>,
    timeout: Duration,
}

impl QueryEmbedder {
    /// `dimension` is the corpus dimensionality; vectors of any other length
    /// are rejected as malformed.
    pub fn new(
        provider: Arc<dyn Embedder>,
        model: impl Into<String>,
        dimension: Option<usize>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            dimension,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Embed a query
    ///
    /// Fails with `EmptyQuery` for blank input and `EmbeddingUnavailable` when
    /// the provider errors, exceeds the timeout, or returns a vector that is
    /// empty, non-finite, or of the wrong dimensionality.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let vector = tokio::time::timeout(self.timeout, self.provider.embed(&self.model, text))
            .await
            .map_err(|_| {
                SearchError::embedding_unavailable(format!(
                    "{} did not answer within {:?}",
                    self.provider.provider_name(),
                    self.timeout
                ))
            })??;

        self.validate(&vector)?;
        debug!("Query embedded - Dimension: {}", vector.len());
        Ok(vector)
    }

    fn validate(&self, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            return Err(SearchError::embedding_unavailable("provider returned an empty vector"));
        }

        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(SearchError::embedding_unavailable(format!(
                    "provider returned dimension {}, corpus uses {}",
                    vector.len(),
                    expected
                )));
            }
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(SearchError::embedding_unavailable(
                "provider returned non-finite vector components",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEmbedder {
        vector: Vec<f32>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    struct SlowEmbedder;

    #[async_trait]
    impl Embedder for SlowEmbedder {
        async fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![1.0])
        }

        fn provider_name(&self) -> &'static str {
            "slow"
        }
    }

    fn embedder(vector: Vec<f32>, dimension: Option<usize>) -> (QueryEmbedder, Arc<FixedEmbedder>) {
        let provider = Arc::new(FixedEmbedder {
            vector,
            calls: AtomicUsize::new(0),
        });
        let query = QueryEmbedder::new(provider.clone(), "test-model", dimension, Duration::from_secs(1));
        (query, provider)
    }

    #[tokio::test]
    async fn test_blank_query_is_empty_query_error() {
        let (query, provider) = embedder(vec![1.0, 0.0], Some(2));
        for text in ["", "   ", "\n\t "] {
            assert!(matches!(query.embed(text).await, Err(SearchError::EmptyQuery)));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_vector_passes() {
        let (query, _) = embedder(vec![0.6, 0.8], Some(2));
        assert_eq!(query.embed("  neural search ").await.unwrap(), vec![0.6, 0.8]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_unavailable() {
        let (query, _) = embedder(vec![0.6, 0.8, 0.0], Some(2));
        assert!(matches!(
            query.embed("neural").await,
            Err(SearchError::EmbeddingUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_non_finite_vector_is_unavailable() {
        let (query, _) = embedder(vec![f32::NAN, 1.0], None);
        assert!(matches!(
            query.embed("neural").await,
            Err(SearchError::EmbeddingUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let query = QueryEmbedder::new(Arc::new(SlowEmbedder), "m", None, Duration::from_millis(20));
        match query.embed("neural").await {
            Err(SearchError::EmbeddingUnavailable(msg)) => assert!(msg.contains("slow")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
