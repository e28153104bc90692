//! Selector error definitions.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can surface from the selection API.
///
/// Per-candidate probe failures are not represented here. They are data on
/// the probe outcome and never propagate past the racer; only pool-wide or
/// collaborator problems reach the caller.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Configuration rejected at construction.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An endpoint string could not be parsed as a URL.
    #[error("invalid candidate url: {0}")]
    InvalidCandidate(#[from] url::ParseError),

    /// The candidate registry could not supply a pool snapshot.
    #[error("candidate source error: {0}")]
    Source(String),

    /// A cached selection could not be encoded or decoded.
    #[error("cache codec error: {0}")]
    CacheCodec(#[from] serde_json::Error),

    /// The selection cache collaborator failed.
    #[error("cache error: {0}")]
    Cache(String),
}

/// Result type for selector operations.
pub type SelectorResult<T> = Result<T, SelectorError>;
