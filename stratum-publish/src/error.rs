//! Error types for publish operations

use stratum_cache::CacheError;
use stratum_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while publishing an event
#[derive(Debug, Error)]
pub enum PublishError {
    /// A malformed argument was rejected before any send was attempted
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resolving the partition's backend client failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The backend rejected or failed the send
    #[error("Send failed on {sink}: {message}")]
    Send { sink: String, message: String },

    /// The event payload could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl PublishError {
    /// Create a send failure for the named sink
    pub fn send(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Send {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Serialization(err.to_string())
    }
}
