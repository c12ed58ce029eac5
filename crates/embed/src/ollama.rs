use async_trait::async_trait;
use expertsearch_common::{Result, SearchError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::retry::{with_retry, AttemptError, RetryPolicy};
use crate::types::{EmbedRequest, EmbedResponse};

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SearchError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {}", base_url);
        Ok(Self {
            base_url,
            client,
            retry: RetryPolicy::default(),
        })
    }

    /// Override retry behaviour
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Single attempt to generate embedding
    async fn try_embed(
        &self,
        url: &str,
        request: &EmbedRequest,
    ) -> std::result::Result<Vec<f32>, AttemptError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("Failed to send embedding request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::from_status(status, &body));
        }

        let result: EmbedResponse = response.json().await.map_err(|e| {
            AttemptError::Fatal(format!("Failed to parse embedding response: {}", e))
        })?;

        if result.embedding.is_empty() {
            return Err(AttemptError::Fatal("Empty embedding from Ollama".into()));
        }

        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        debug!("Generating embedding - Model: {}, Text length: {}", model, text.len());

        let request = EmbedRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let embedding = with_retry("ollama", self.retry, || self.try_embed(&url, &request)).await?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.provider_name(), "ollama");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_embedding_unavailable() {
        // Reserve a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = OllamaClient::new(format!("http://127.0.0.1:{}", port), Duration::from_secs(2))
            .unwrap()
            .with_retry(RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
            });

        let result = client.embed("nomic-embed-text", "rust").await;
        assert!(matches!(result, Err(SearchError::EmbeddingUnavailable(_))));
    }

    #[test]
    fn test_request_shape() {
        let request = EmbedRequest {
            model: "nomic-embed-text".into(),
            prompt: "neural networks".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["prompt"], "neural networks");
    }
}
