//! Error types for caching operations

use stratum_core::{PartitionError, ValidationError};
use thiserror::Error;

/// Errors that can occur while resolving a cached client or credential
#[derive(Debug, Error)]
pub enum CacheError {
    /// A malformed argument was rejected before any cache access
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Partition configuration could not be resolved
    #[error(transparent)]
    Partition(#[from] PartitionError),

    /// Credential acquisition failed
    #[error("Credential acquisition failed: {0}")]
    Auth(String),

    /// Client construction failed for a reason other than the above
    #[error("Client construction failed: {0}")]
    Construction(String),
}

/// Result type for caching operations
pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
    /// Whether a later call for the same key may reasonably retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheError::Auth(_) | CacheError::Construction(_))
    }
}
