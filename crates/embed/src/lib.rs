//! Expert search embedding providers
//!
//! OpenAI and Ollama embedding clients behind the [`Embedder`] trait

mod embedder;
mod ollama;
mod openai;
mod retry;
mod types;

use std::sync::Arc;
use std::time::Duration;

use expertsearch_common::{AppConfig, EmbeddingProvider, Result, SearchError};

pub use embedder::Embedder;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use retry::RetryPolicy;
pub use types::{EmbedRequest, EmbedResponse, OpenAiEmbedRequest, OpenAiEmbedResponse, OpenAiEmbedding};

/// Build the configured embedding provider
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let timeout = Duration::from_secs(config.embedding_timeout_secs);
    let retry = RetryPolicy::new(config.embedding_max_retries);

    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::OpenAi => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                SearchError::config("OPENAI_API_KEY is required for the openai provider")
            })?;
            Arc::new(OpenAiClient::new(&config.openai_base_url, api_key, timeout)?.with_retry(retry))
        }
        EmbeddingProvider::Ollama => {
            Arc::new(OllamaClient::new(&config.ollama_base_url, timeout)?.with_retry(retry))
        }
    };

    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ollama_embedder() {
        let config = AppConfig {
            embedding_provider: EmbeddingProvider::Ollama,
            ..AppConfig::default()
        };
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.provider_name(), "ollama");
    }

    #[test]
    fn test_openai_requires_key() {
        let config = AppConfig {
            openai_api_key: None,
            ..AppConfig::default()
        };
        assert!(matches!(build_embedder(&config), Err(SearchError::Config(_))));

        let config = AppConfig {
            openai_api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        assert_eq!(build_embedder(&config).unwrap().provider_name(), "openai");
    }
}
