//! Expert search vector retrieval
//!
//! Embedding store, query embedding, similarity ranking and result
//! normalization

mod engine;
pub mod normalize;
mod query;
mod ranker;
pub mod similarity;
mod store;
mod types;

pub use engine::VectorSearchEngine;
pub use normalize::{normalize_similarity, sanitize_score, truncate_for_display, TRUNCATION_MARKER};
pub use query::QueryEmbedder;
pub use ranker::rank;
pub use similarity::cosine_similarity;
pub use store::{parse_embedding, CorpusSource, EmbeddingStore};
pub use types::{
    CorpusIntegrityWarning, CorpusRow, Document, DocumentId, LiteralRecord, RankingPolicy,
    ScoredCandidate, SemanticRecord, StoreStats,
};
