//! Error types for retrieval

use thiserror::Error;

/// Errors that can occur during retrieval
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Vector search backend failed
    #[error("Vector search error: {0}")]
    VectorSearch(String),

    /// Embedding a document or query failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Embedding has the wrong dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Graph backend failed
    #[error("Graph error: {0}")]
    Graph(String),

    /// Corpus file could not be read or parsed
    #[error("Corpus error: {0}")]
    Corpus(String),
}

impl From<serde_json::Error> for RetrievalError {
    fn from(e: serde_json::Error) -> Self {
        RetrievalError::Corpus(e.to_string())
    }
}

impl From<std::io::Error> for RetrievalError {
    fn from(e: std::io::Error) -> Self {
        RetrievalError::Corpus(e.to_string())
    }
}
