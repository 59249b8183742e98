//! Traits for publish backends.
//!
//! The actual broker clients are vendor SDK handles owned by the embedding
//! application; the facade only ever calls `send` on them.

use crate::error::PublishError;
use crate::message::PublishInfo;
use async_trait::async_trait;
use stratum_core::PartitionInfo;

/// One publish backend for one partition.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Backend name used in logs and errors
    fn name(&self) -> &str;

    /// Send one event to `destination`
    async fn send(&self, destination: &str, info: &PublishInfo) -> Result<(), PublishError>;
}

/// Builds a backend client from a partition's resolved configuration.
///
/// Invoked at most once per partition per backend; the facade caches the
/// result.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    /// Create a client for `partition`
    async fn create(&self, partition: &PartitionInfo) -> Result<Box<dyn MessageSink>, PublishError>;
}
