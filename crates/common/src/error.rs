/// Expert search error types
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Corpus could not be loaded into a consistent store (fatal at startup)
    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    /// Embedding provider unreachable, timed out, or returned malformed data
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Query was empty after trimming whitespace
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Literal search backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SearchError {
    /// Create corpus load error
    pub fn corpus_load<S: Into<String>>(msg: S) -> Self {
        Self::CorpusLoad(msg.into())
    }

    /// Create embedding unavailable error
    pub fn embedding_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    /// Create storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a caller may retry the same request and expect a different outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable(_) | Self::Storage(_))
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::CorpusLoad(_) => "corpus_load",
            Self::EmbeddingUnavailable(_) => "embedding_unavailable",
            Self::EmptyQuery => "empty_query",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Other(_) => "internal",
        }
    }
}

// HTTP response conversion
impl SearchError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyQuery => 400,
            Self::InvalidInput(_) => 400,
            Self::Json(_) => 400,
            Self::EmbeddingUnavailable(_) => 503,
            Self::CorpusLoad(_) => 500,
            Self::Storage(_) => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_distinguish_input_from_provider() {
        assert_eq!(SearchError::EmptyQuery.status_code(), 400);
        assert_eq!(SearchError::embedding_unavailable("down").status_code(), 503);
        assert_eq!(SearchError::storage("locked").status_code(), 500);
    }

    #[test]
    fn test_retryable() {
        assert!(SearchError::embedding_unavailable("timeout").is_retryable());
        assert!(!SearchError::EmptyQuery.is_retryable());
        assert!(!SearchError::corpus_load("bad row").is_retryable());
    }
}
