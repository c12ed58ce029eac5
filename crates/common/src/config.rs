use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Embedding provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    OpenAi,
    Ollama,
}

impl EmbeddingProvider {
    /// Parse provider name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, SearchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(SearchError::config(format!(
                "Unknown embedding provider '{}' (expected openai or ollama)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

/// Expert search application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database holding the expert_profiles table
    pub database_path: PathBuf,

    /// Embedding provider backend
    pub embedding_provider: EmbeddingProvider,

    /// Embedding model name (must match the model the corpus was built with)
    pub embedding_model: String,

    /// Expected embedding dimension (checked at corpus load when set)
    pub embedding_dim: Option<usize>,

    /// OpenAI API key
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub openai_base_url: String,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Upper bound on one query embedding, retries included
    pub embedding_timeout_secs: u64,

    /// Attempts per embedding request
    pub embedding_max_retries: u32,

    /// Maximum number of semantic search results
    pub search_top_k: usize,

    /// Candidates below this raw similarity are dropped
    pub min_similarity: Option<f32>,

    /// Literal search profile text display limit (characters)
    pub literal_profile_max_chars: usize,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/experts.db"),
            embedding_provider: EmbeddingProvider::OpenAi,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dim: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_timeout_secs: 30,
            embedding_max_retries: 3,
            search_top_k: 10,
            min_similarity: None,
            literal_profile_max_chars: 200,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            cors_origins: default_cors_origins(),
            log_dir: PathBuf::from("./data/log"),
            log_level: "info".to_string(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:5174".to_string(),
    ]
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let embedding_provider = match std::env::var("EMBEDDING_PROVIDER") {
            Ok(name) => EmbeddingProvider::parse(&name)?,
            Err(_) => defaults.embedding_provider,
        };

        let config = Self {
            database_path: Self::get_env_path("DATABASE_PATH")
                .unwrap_or(defaults.database_path),
            embedding_provider,
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dim: Self::get_env_parsed("EMBEDDING_DIM")?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_timeout_secs: Self::get_env_parsed("EMBEDDING_TIMEOUT_SECS")?
                .unwrap_or(defaults.embedding_timeout_secs),
            embedding_max_retries: Self::get_env_parsed("EMBEDDING_MAX_RETRIES")?
                .unwrap_or(defaults.embedding_max_retries),
            search_top_k: Self::get_env_parsed("SEARCH_TOP_K")?
                .unwrap_or(defaults.search_top_k),
            min_similarity: Self::get_env_parsed("MIN_SIMILARITY")?,
            literal_profile_max_chars: Self::get_env_parsed("LITERAL_PROFILE_MAX_CHARS")?
                .unwrap_or(defaults.literal_profile_max_chars),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?
                .unwrap_or(defaults.server_port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origin_list(&s))
                .unwrap_or(defaults.cors_origins),
            log_dir: Self::get_env_path("LOG_DIR")
                .unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or(defaults.log_level),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Parse an optional environment variable, rejecting malformed values
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, SearchError> {
        match std::env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| SearchError::config(format!("Invalid value for {}: '{}'", key, raw))),
            _ => Ok(None),
        }
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.embedding_model.trim().is_empty() {
            return Err(SearchError::config("Embedding model name cannot be empty"));
        }

        let base_url = match self.embedding_provider {
            EmbeddingProvider::OpenAi => &self.openai_base_url,
            EmbeddingProvider::Ollama => &self.ollama_base_url,
        };
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SearchError::config(
                "Embedding provider base URL must start with http:// or https://",
            ));
        }

        if self.embedding_dim == Some(0) {
            return Err(SearchError::config("Embedding dimension cannot be 0"));
        }

        if self.embedding_timeout_secs == 0 {
            return Err(SearchError::config("Embedding timeout cannot be 0"));
        }

        if self.embedding_max_retries == 0 {
            return Err(SearchError::config("Embedding retries must be at least 1"));
        }

        if self.search_top_k == 0 {
            return Err(SearchError::config("Search top_k must be at least 1"));
        }

        if let Some(floor) = self.min_similarity {
            if !floor.is_finite() || !(-1.0..=1.0).contains(&floor) {
                return Err(SearchError::config("Minimum similarity must lie in [-1, 1]"));
            }
        }

        if self.literal_profile_max_chars == 0 {
            return Err(SearchError::config("Literal profile length limit cannot be 0"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(SearchError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.search_top_k, 10);
        assert_eq!(config.literal_profile_max_chars, 200);
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.search_top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.min_similarity = Some(f32::NAN);
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.embedding_provider = EmbeddingProvider::Ollama;
        invalid_config.ollama_base_url = "localhost:11434".to_string();
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(EmbeddingProvider::parse("OpenAI").unwrap(), EmbeddingProvider::OpenAi);
        assert_eq!(EmbeddingProvider::parse(" ollama ").unwrap(), EmbeddingProvider::Ollama);
        assert!(EmbeddingProvider::parse("cohere").is_err());
    }

    #[test]
    fn test_parse_origin_list() {
        let origins = parse_origin_list("http://a.test, ,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }
}
