//! Cache errors. Never surfaced past the cache layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
