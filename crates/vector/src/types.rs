use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stable document identifier (the corpus row id)
pub type DocumentId = i64;

/// Raw corpus row as handed over by a corpus source
///
/// Embedding columns hold JSON-encoded float arrays; `None` or a blank
/// string means the embedding was never generated.
#[derive(Debug, Clone, Default)]
pub struct CorpusRow {
    pub id: DocumentId,
    pub category: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub profile_text: Option<String>,
    pub url: Option<String>,
    pub profile_embedding: Option<String>,
    pub label_embedding: Option<String>,
}

/// Expert profile document with its pre-computed embeddings
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub category: String,
    pub name: String,
    pub label: String,
    pub profile_text: String,
    pub url: Option<String>,
    pub profile_embedding: Option<Vec<f32>>,
    pub label_embedding: Option<Vec<f32>>,
}

impl Document {
    /// Whether the document takes part in vector ranking
    pub fn is_rankable(&self) -> bool {
        self.profile_embedding.is_some()
    }
}

/// Document excluded from ranking at load time
#[derive(Debug, Clone, Serialize)]
pub struct CorpusIntegrityWarning {
    pub document_id: DocumentId,
    pub name: String,
    pub reason: String,
}

/// Ranked candidate for a single query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub document_id: DocumentId,

    /// Cosine similarity of query and profile embedding, theoretically [-1, 1]
    pub raw_similarity: f32,

    /// Sanitized and clamped into [0, 1]
    pub normalized_similarity: f32,

    /// Cosine similarity against the label embedding. Computed but not
    /// blended into the ranking score.
    pub label_similarity: Option<f32>,
}

/// Semantic search result record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SemanticRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Label")]
    pub label: String,

    /// Full profile text, never truncated
    #[serde(rename = "Profile_Chunk")]
    pub profile_text: String,

    /// Similarity score (0.0 to 1.0)
    #[serde(rename = "Similarity")]
    pub similarity: f32,
}

/// Literal search result record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LiteralRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Label")]
    pub label: String,

    /// Profile text truncated for display
    #[serde(rename = "Profile_Chunk")]
    pub profile_text: String,

    #[serde(rename = "URL")]
    pub url: Option<String>,
}

/// Ranking parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    /// Maximum number of candidates returned
    pub top_k: usize,

    /// Candidates with raw similarity below this are dropped
    pub min_similarity: Option<f32>,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_similarity: None,
        }
    }
}

/// Embedding store summary
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub ranked_documents: usize,
    pub label_embeddings: usize,
    pub dimension: Option<usize>,
    pub warnings: usize,
    pub loaded_at: DateTime<Utc>,
}
