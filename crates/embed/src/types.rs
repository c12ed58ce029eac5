use serde::{Deserialize, Serialize};

/// Ollama embedding request
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model name (e.g., "nomic-embed-text")
    pub model: String,

    /// Text to embed
    pub prompt: String,
}

/// Ollama embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// OpenAI embedding request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiEmbedRequest {
    /// Model name (e.g., "text-embedding-3-small")
    pub model: String,

    /// Text to embed
    pub input: String,

    /// Always "float"
    pub encoding_format: &'static str,
}

/// OpenAI embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiEmbedResponse {
    pub data: Vec<OpenAiEmbedding>,

    #[serde(default)]
    pub model: Option<String>,
}

/// One entry of the OpenAI `data` array
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiEmbedding {
    pub embedding: Vec<f32>,

    #[serde(default)]
    pub index: usize,
}
