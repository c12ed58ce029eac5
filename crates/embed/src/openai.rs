use async_trait::async_trait;
use expertsearch_common::{Result, SearchError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::retry::{with_retry, AttemptError, RetryPolicy};
use crate::types::{OpenAiEmbedRequest, OpenAiEmbedResponse};

/// OpenAI-compatible `/embeddings` client
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
    retry: RetryPolicy,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create new OpenAI client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::config("OPENAI_API_KEY is required for the openai provider"));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SearchError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("OpenAI embedding client initialized: {}", base_url);
        Ok(Self {
            base_url,
            api_key,
            client,
            retry: RetryPolicy::default(),
        })
    }

    /// Override retry behaviour
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn try_embed(
        &self,
        url: &str,
        request: &OpenAiEmbedRequest,
    ) -> std::result::Result<Vec<f32>, AttemptError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::from_status(status, &body));
        }

        let result: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(format!("Invalid JSON response: {}", e)))?;

        first_embedding(result).map_err(AttemptError::Fatal)
    }
}

/// Pick the single embedding out of a one-input response
fn first_embedding(response: OpenAiEmbedResponse) -> std::result::Result<Vec<f32>, String> {
    let item = response
        .data
        .into_iter()
        .min_by_key(|item| item.index)
        .ok_or_else(|| "API response did not contain embeddings".to_string())?;

    if item.embedding.is_empty() {
        return Err("API returned an empty embedding".to_string());
    }

    Ok(item.embedding)
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);

        debug!("Generating embedding - Model: {}, Text length: {}", model, text.len());

        let request = OpenAiEmbedRequest {
            model: model.to_string(),
            input: text.to_string(),
            encoding_format: "float",
        };

        let embedding = with_retry("openai", self.retry, || self.try_embed(&url, &request)).await?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_rejected() {
        let result = OpenAiClient::new("https://api.openai.com/v1", "  ", Duration::from_secs(5));
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client =
            OpenAiClient::new("https://api.openai.com/v1/", "sk-secret", Duration::from_secs(5))
                .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("https://api.openai.com/v1"));
    }

    #[test]
    fn test_request_shape() {
        let request = OpenAiEmbedRequest {
            model: "text-embedding-3-small".into(),
            input: "graph neural networks".into(),
            encoding_format: "float",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], "graph neural networks");
        assert_eq!(json["encoding_format"], "float");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 3, "total_tokens": 3}
        }"#;
        let response: OpenAiEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_embedding(response).unwrap(), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_empty_data_is_error() {
        let response: OpenAiEmbedResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(first_embedding(response).is_err());

        let response: OpenAiEmbedResponse =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": []}]}"#).unwrap();
        assert!(first_embedding(response).is_err());
    }

    #[test]
    fn test_malformed_embedding_fails_to_parse() {
        let result: std::result::Result<OpenAiEmbedResponse, _> =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": ["a", "b"]}]}"#);
        assert!(result.is_err());
    }
}
