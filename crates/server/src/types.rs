use chrono::{DateTime, Utc};
use expertsearch_vector::CorpusIntegrityWarning;
use serde::{Deserialize, Serialize};

/// Search request body (both search modes)
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query text
    pub query: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Embedding store statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: usize,
    pub ranked_documents: usize,
    pub label_embeddings: usize,
    pub dimension: Option<usize>,
    pub embedding_model: String,
    pub embedding_provider: String,
    pub loaded_at: DateTime<Utc>,

    /// Documents excluded from vector search
    pub excluded: Vec<CorpusIntegrityWarning>,
}
