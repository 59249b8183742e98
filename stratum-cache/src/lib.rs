//! Client and credential caching for the Stratum platform.
//!
//! Connecting to a partition's resources (database, message topic, key
//! store) involves network round trips and authentication, so handles are
//! built once and reused. This crate provides:
//!
//! - **[`ClientCache`]** - keyed client-handle cache with single-flight
//!   construction: N concurrent first-time requests for one key collapse
//!   into a single build
//! - **[`PartitionClients`]** - partition-scoped wrapper that resolves
//!   partition configuration through a [`PartitionDirectory`] exactly once
//!   per constructed client
//! - **[`CredentialCache`]** - per-audience security-token cache that
//!   refreshes tokens a configurable margin before they expire
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stratum_cache::PartitionClients;
//! use stratum_core::{InMemoryPartitionDirectory, PartitionInfo};
//!
//! # struct TopicClient { endpoint: String }
//! # async fn example() -> Result<(), stratum_cache::CacheError> {
//! let directory = Arc::new(InMemoryPartitionDirectory::new());
//! directory
//!     .insert(PartitionInfo::new("acme").with_property("topic-endpoint", "amqps://acme"))
//!     .await;
//!
//! let clients: PartitionClients<TopicClient> = PartitionClients::new(directory, "topic");
//! let client = clients
//!     .get_or_create("acme", |partition| async move {
//!         Ok(TopicClient {
//!             endpoint: partition.str_property("topic-endpoint")?.to_string(),
//!         })
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`PartitionDirectory`]: stratum_core::PartitionDirectory

pub mod client_cache;
pub mod credentials;
pub mod error;
pub mod partition_clients;

pub use client_cache::{ClientCache, Resolution, partition_key};
pub use credentials::{AccessToken, CredentialCache, CredentialCacheConfig, TokenSource};
pub use error::{CacheError, CacheResult};
pub use partition_clients::PartitionClients;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client_cache::{ClientCache, Resolution};
    pub use crate::credentials::{AccessToken, CredentialCache, CredentialCacheConfig, TokenSource};
    pub use crate::error::{CacheError, CacheResult};
    pub use crate::partition_clients::PartitionClients;
}
