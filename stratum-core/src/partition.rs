//! Partition model and directory
//!
//! A partition's configuration is a bag of named properties (connection
//! strings, endpoints, feature flags). Values holding secrets are marked
//! sensitive so callers know to resolve them through their secret store
//! rather than log or display them.

use crate::validation::{ValidationError, require_allowed_characters, require_non_empty};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Partition lookup errors
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Partition not found: {0}")]
    NotFound(String),

    #[error("Partition configuration invalid: {0}")]
    Invalid(String),

    #[error("Partition storage error: {0}")]
    Storage(String),
}

/// A single partition property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Whether the value refers to a secret rather than holding it directly
    #[serde(default)]
    pub sensitive: bool,

    /// Property value
    pub value: serde_json::Value,
}

impl Property {
    /// Create a non-sensitive property
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            sensitive: false,
            value: value.into(),
        }
    }

    /// Create a sensitive property
    pub fn sensitive(value: impl Into<serde_json::Value>) -> Self {
        Self {
            sensitive: true,
            value: value.into(),
        }
    }
}

/// Connection settings and feature flags for one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionInfo {
    /// Partition identifier
    pub id: String,

    /// Named configuration properties
    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

impl PartitionInfo {
    /// Create a new partition with no properties
    ///
    /// # Examples
    ///
    /// ```
    /// use stratum_core::PartitionInfo;
    ///
    /// let partition = PartitionInfo::new("acme")
    ///     .with_property("topic-name", "recordstopic")
    ///     .with_sensitive_property("broker-key", "broker-key-ref");
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: HashMap::new(),
        }
    }

    /// Add a property
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), Property::new(value));
        self
    }

    /// Add a sensitive property
    pub fn with_sensitive_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), Property::sensitive(value));
        self
    }

    /// Get a property by name
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Get a required string property
    pub fn str_property(&self, key: &str) -> Result<&str, PartitionError> {
        self.property(key)
            .and_then(|p| p.value.as_str())
            .ok_or_else(|| {
                PartitionError::Invalid(format!(
                    "partition {} has no string property {:?}",
                    self.id, key
                ))
            })
    }

    /// Get a boolean property, falling back to `default` when absent
    pub fn bool_property(&self, key: &str, default: bool) -> bool {
        self.property(key)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(default)
    }
}

/// Partition directory trait
///
/// The authoritative source of partition configuration. Consulted by the
/// client caches only on a cache miss; implementations typically wrap the
/// deployment's partition service.
#[async_trait]
pub trait PartitionDirectory: Send + Sync {
    /// Resolve configuration for one partition
    async fn get_partition(&self, partition_id: &str) -> Result<PartitionInfo, PartitionError>;

    /// List all known partition ids
    async fn list_partitions(&self) -> Result<Vec<String>, PartitionError>;
}

/// In-memory partition directory
///
/// Map-backed [`PartitionDirectory`] for tests, local development, and
/// bootstrapping fixed topologies.
#[derive(Default)]
pub struct InMemoryPartitionDirectory {
    partitions: RwLock<HashMap<String, PartitionInfo>>,
}

impl InMemoryPartitionDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a partition
    pub async fn insert(&self, partition: PartitionInfo) {
        let mut partitions = self.partitions.write().await;
        partitions.insert(partition.id.clone(), partition);
    }

    /// Remove a partition
    pub async fn remove(&self, partition_id: &str) -> Option<PartitionInfo> {
        let mut partitions = self.partitions.write().await;
        partitions.remove(partition_id)
    }
}

#[async_trait]
impl PartitionDirectory for InMemoryPartitionDirectory {
    async fn get_partition(&self, partition_id: &str) -> Result<PartitionInfo, PartitionError> {
        let partition_id = require_non_empty(Some(partition_id), "partition id")?;
        require_allowed_characters(partition_id, "partition id")?;

        let partitions = self.partitions.read().await;
        partitions
            .get(partition_id)
            .cloned()
            .ok_or_else(|| PartitionError::NotFound(partition_id.to_string()))
    }

    async fn list_partitions(&self) -> Result<Vec<String>, PartitionError> {
        let partitions = self.partitions.read().await;
        let mut ids: Vec<String> = partitions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
