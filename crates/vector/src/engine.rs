use expertsearch_common::{Result, SearchError};
use std::sync::Arc;
use tracing::{debug, info};

use crate::normalize::to_semantic_record;
use crate::query::QueryEmbedder;
use crate::ranker::rank;
use crate::store::EmbeddingStore;
use crate::types::{RankingPolicy, ScoredCandidate, SemanticRecord, StoreStats};

/// Vector search engine
///
/// Query text → query vector → ranked candidates → normalized records.
#[derive(Clone)]
pub struct VectorSearchEngine {
    store: Arc<EmbeddingStore>,
    embedder: QueryEmbedder,
    policy: RankingPolicy,
}

impl VectorSearchEngine {
    /// Create new vector search engine over an already loaded store
    pub fn new(store: Arc<EmbeddingStore>, embedder: QueryEmbedder, policy: RankingPolicy) -> Self {
        info!(
            "Vector search engine initialized - {} ranked documents, provider {}, model {}, top_k {}",
            store.ranked_count(),
            embedder.provider_name(),
            embedder.model(),
            policy.top_k
        );

        Self {
            store,
            embedder,
            policy,
        }
    }

    /// Search for similar documents
    ///
    /// An empty result set is a valid answer; failures are reported as
    /// `EmptyQuery` or `EmbeddingUnavailable`, never as an empty list.
    pub async fn search(&self, query: &str) -> Result<Vec<SemanticRecord>> {
        let candidates = self.rank_query(query).await?;

        candidates
            .iter()
            .map(|candidate| {
                self.store
                    .get(candidate.document_id)
                    .map(|doc| to_semantic_record(candidate, doc))
                    .ok_or_else(|| {
                        SearchError::internal(format!(
                            "ranked document {} missing from store",
                            candidate.document_id
                        ))
                    })
            })
            .collect()
    }

    /// Ranked candidates without record conversion
    pub async fn rank_query(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        debug!("Searching for: {} (top_k={})", query, self.policy.top_k);

        let query_embedding = self.embedder.embed(query).await?;
        let candidates = rank(&query_embedding, &self.store, &self.policy);

        info!(
            "Search completed - {} results (from {} ranked documents)",
            candidates.len(),
            self.store.ranked_count()
        );
        Ok(candidates)
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    pub fn provider_name(&self) -> &'static str {
        self.embedder.provider_name()
    }

    /// Get index statistics
    pub fn stats(&self) -> (StoreStats, String) {
        (self.store.stats(), self.embedder.model().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CorpusRow;
    use async_trait::async_trait;
    use expertsearch_embed::Embedder;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Maps known texts to fixed vectors; anything else is "provider down"
    struct LookupEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for LookupEmbedder {
        async fn embed(&self, _model: &str, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| SearchError::embedding_unavailable("connection refused"))
        }

        fn provider_name(&self) -> &'static str {
            "lookup"
        }
    }

    fn row(id: i64, name: &str, profile: &str, embedding: Option<&str>) -> CorpusRow {
        CorpusRow {
            id,
            category: Some("Engineering".into()),
            name: Some(name.into()),
            label: Some("Expert".into()),
            profile_text: Some(profile.into()),
            url: Some(format!("https://experts.test/{}", id)),
            profile_embedding: embedding.map(String::from),
            label_embedding: None,
        }
    }

    fn engine() -> VectorSearchEngine {
        let store = EmbeddingStore::from_rows(
            vec![
                row(1, "A", "Neural network compilers", Some("[0.92, 0.391918]")),
                row(2, "B", "Database internals", Some("[0.4, 0.916515]")),
                row(3, "C", "Not yet embedded", None),
            ],
            Some(2),
        )
        .unwrap();

        let mut vectors = HashMap::new();
        vectors.insert("X".to_string(), vec![1.0, 0.0]);
        vectors.insert("Database internals".to_string(), vec![0.4, 0.916515]);
        let provider = Arc::new(LookupEmbedder { vectors });

        let embedder = QueryEmbedder::new(provider, "test-model", store.dimension(), Duration::from_secs(1));
        VectorSearchEngine::new(Arc::new(store), embedder, RankingPolicy::default())
    }

    #[tokio::test]
    async fn test_search_example_a_b_c() {
        let results = engine().search("X").await.unwrap();

        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!((results[0].similarity - 0.92).abs() < 1e-3);
        assert!((results[1].similarity - 0.40).abs() < 1e-3);
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.similarity)));
    }

    #[tokio::test]
    async fn test_own_profile_text_ranks_itself_first() {
        let results = engine().search("Database internals").await.unwrap();
        assert_eq!(results[0].name, "B");
        assert_eq!(results[0].profile_text, "Database internals");
    }

    #[tokio::test]
    async fn test_whitespace_query_is_error_not_empty_list() {
        assert!(matches!(engine().search("   ").await, Err(SearchError::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        assert!(matches!(
            engine().search("unknown text").await,
            Err(SearchError::EmbeddingUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let engine = engine();
        let first = engine.search("X").await.unwrap();
        let second = engine.search("X").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_list() {
        let mut vectors = HashMap::new();
        vectors.insert("X".to_string(), vec![1.0, 0.0]);
        let embedder = QueryEmbedder::new(
            Arc::new(LookupEmbedder { vectors }),
            "test-model",
            None,
            Duration::from_secs(1),
        );
        let engine = VectorSearchEngine::new(
            Arc::new(EmbeddingStore::empty()),
            embedder,
            RankingPolicy::default(),
        );

        assert!(engine.search("X").await.unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let (stats, model) = engine().stats();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.ranked_documents, 2);
        assert_eq!(stats.dimension, Some(2));
        assert_eq!(model, "test-model");
    }
}
