//! Chronocache error types

/// Chronocache error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    // Downstream errors
    #[error("downstream query failed: {0}")]
    Downstream(String),

    // Stored-entry errors
    #[error("decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("compression error: {0}")]
    Compression(String),

    // Result assembly errors
    #[error("cannot merge responses: {0}")]
    Merge(String),

    // Backend errors (store side only; fetch trouble is treated as a miss)
    #[error("cache backend error: {0}")]
    Backend(String),

    // Input errors
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for chronocache operations
pub type Result<T> = std::result::Result<T, CacheError>;
