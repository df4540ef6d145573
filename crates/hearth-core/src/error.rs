use thiserror::Error;

/// Engine-wide error taxonomy.
///
/// Library APIs return these typed errors across the worker boundary; the
/// CLI layer turns them into user-facing messages instead of surfacing raw
/// internals.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model load failed: {0}")]
    LoadFailure(String),

    #[error("No model loaded")]
    NotLoaded,

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Vector store I/O error: {0}")]
    VectorStoreIo(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid chunking parameters: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::VectorStoreIo(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::VectorStoreIo(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
