use async_trait::async_trait;
use expertsearch_common::Result;

/// Common trait for embedding providers
///
/// Implementations report every provider-side failure as
/// `SearchError::EmbeddingUnavailable`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for text
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;

    /// Short provider name for logs and stats
    fn provider_name(&self) -> &'static str;
}
