pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingProvider};
pub use error::SearchError;
pub type Result<T> = std::result::Result<T, SearchError>;
