use expertsearch_common::{AppConfig, Result, SearchError};
use expertsearch_embed::Embedder;
use expertsearch_storage::ProfileDatabase;
use expertsearch_vector::{EmbeddingStore, QueryEmbedder, RankingPolicy, VectorSearchEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared application state
///
/// Everything here is read-only after startup, so handlers share it
/// through an `Arc` without locking.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Semantic search over the embedding store
    pub vector_search: VectorSearchEngine,

    /// Literal search backing store
    pub profiles: ProfileDatabase,
}

impl AppState {
    /// Open the database, load the embedding store and wire the engine
    ///
    /// Fails with `CorpusLoad` when the corpus is inconsistent; the server
    /// must not start in that case.
    pub async fn initialize(config: AppConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let profiles = ProfileDatabase::open(&config.database_path)?;

        let source = profiles.clone();
        let expected_dim = config.embedding_dim;
        let store = tokio::task::spawn_blocking(move || EmbeddingStore::load(&source, expected_dim))
            .await
            .map_err(|e| SearchError::internal(format!("corpus load task failed: {}", e)))??;

        Ok(Self::from_parts(config, Arc::new(store), embedder, profiles))
    }

    /// Assemble state from an already loaded store
    pub fn from_parts(
        config: AppConfig,
        store: Arc<EmbeddingStore>,
        embedder: Arc<dyn Embedder>,
        profiles: ProfileDatabase,
    ) -> Self {
        let query_embedder = QueryEmbedder::new(
            embedder,
            config.embedding_model.clone(),
            store.dimension().or(config.embedding_dim),
            Duration::from_secs(config.embedding_timeout_secs),
        );
        let policy = RankingPolicy {
            top_k: config.search_top_k,
            min_similarity: config.min_similarity,
        };

        info!(
            "Application state ready - {} documents ({} searchable by vector)",
            store.len(),
            store.ranked_count()
        );

        Self {
            vector_search: VectorSearchEngine::new(store, query_embedder, policy),
            profiles,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use expertsearch_storage::NewProfile;
    use std::path::Path;
    use tempfile::tempdir;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn provider_name(&self) -> &'static str {
            "unit"
        }
    }

    fn config_for(path: &Path) -> AppConfig {
        AppConfig {
            database_path: path.to_path_buf(),
            ..AppConfig::default()
        }
    }

    fn seed(path: &Path, embeddings: &[&str]) {
        let db = ProfileDatabase::create(path).unwrap();
        let profiles: Vec<_> = embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| NewProfile {
                category: Some("AI".into()),
                name: Some(format!("Expert {}", i)),
                label: Some("Researcher".into()),
                profile: Some("Neural networks".into()),
                profile_embedding: Some(embedding.to_string()),
                ..NewProfile::default()
            })
            .collect();
        db.insert_profiles(&profiles).unwrap();
    }

    #[tokio::test]
    async fn test_initialize_loads_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("experts.db");
        seed(&path, &["[1.0, 0.0]", "[0.0, 1.0]"]);

        let state = AppState::initialize(config_for(&path), Arc::new(UnitEmbedder))
            .await
            .unwrap();
        assert_eq!(state.vector_search.store().ranked_count(), 2);

        let results = state.vector_search.search("neural").await.unwrap();
        assert_eq!(results[0].name, "Expert 0");
    }

    #[tokio::test]
    async fn test_broken_corpus_aborts_startup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("experts.db");
        seed(&path, &["[0.1, 0.2, 0.3]", "[1,2,broken]"]);

        let result = AppState::initialize(config_for(&path), Arc::new(UnitEmbedder)).await;
        assert!(matches!(result, Err(SearchError::CorpusLoad(_))));
    }

    #[tokio::test]
    async fn test_missing_database_aborts_startup() {
        let dir = tempdir().unwrap();
        let config = config_for(&dir.path().join("absent.db"));

        let result = AppState::initialize(config, Arc::new(UnitEmbedder)).await;
        assert!(matches!(result, Err(SearchError::Config(_))));
    }
}
