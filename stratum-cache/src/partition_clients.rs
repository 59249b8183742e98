//! Partition-scoped client resolution.
//!
//! Wraps a [`ClientCache`] with partition-id validation, composite keying,
//! and directory lookup: on a miss the partition's configuration is read
//! from the [`PartitionDirectory`] exactly once and handed to the builder.

use crate::client_cache::{ClientCache, Resolution, partition_key};
use crate::error::CacheResult;
use std::future::Future;
use std::sync::Arc;
use stratum_core::partition::{PartitionDirectory, PartitionInfo};
use stratum_core::validation::{require_allowed_characters, require_non_empty};

/// Cache of per-partition client handles for one resource kind.
///
/// One instance per resource kind (storage, message topic, crypto keys, ...),
/// all sharing the process-wide partition directory. Constructed once at
/// process start and passed by handle to consumers; tests construct isolated
/// instances.
pub struct PartitionClients<V> {
    directory: Arc<dyn PartitionDirectory>,
    resource: String,
    cache: ClientCache<V>,
}

impl<V> PartitionClients<V> {
    /// Create an empty cache for `resource`-kind clients
    pub fn new(directory: Arc<dyn PartitionDirectory>, resource: impl Into<String>) -> Self {
        Self {
            directory,
            resource: resource.into(),
            cache: ClientCache::new(),
        }
    }

    /// The resource-kind discriminator baked into every key
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The underlying keyed cache
    pub fn cache(&self) -> &ClientCache<V> {
        &self.cache
    }

    fn validate(partition_id: &str) -> CacheResult<()> {
        require_non_empty(Some(partition_id), "partition id")?;
        require_allowed_characters(partition_id, "partition id")?;
        Ok(())
    }

    /// Return the partition's cached client, building it on a miss.
    ///
    /// The builder receives the partition's resolved configuration; the
    /// directory is consulted only when a build actually runs.
    pub async fn get_or_create<F, Fut>(&self, partition_id: &str, build: F) -> CacheResult<Arc<V>>
    where
        F: FnOnce(PartitionInfo) -> Fut,
        Fut: Future<Output = CacheResult<V>>,
    {
        Self::validate(partition_id)?;
        let key = partition_key(partition_id, &self.resource);
        self.cache
            .get_or_create(&key, || async move {
                let partition = self.directory.get_partition(partition_id).await?;
                build(partition).await
            })
            .await
    }

    /// Degraded variant: a failed build caches `placeholder()` until a
    /// later build succeeds. See
    /// [`ClientCache::get_or_create_degraded`].
    pub async fn get_or_create_degraded<F, Fut, P>(
        &self,
        partition_id: &str,
        build: F,
        placeholder: P,
    ) -> CacheResult<Resolution<V>>
    where
        F: FnOnce(PartitionInfo) -> Fut,
        Fut: Future<Output = CacheResult<V>>,
        P: FnOnce() -> V,
    {
        Self::validate(partition_id)?;
        let key = partition_key(partition_id, &self.resource);
        self.cache
            .get_or_create_degraded(
                &key,
                || async move {
                    let partition = self.directory.get_partition(partition_id).await?;
                    build(partition).await
                },
                placeholder,
            )
            .await
    }

    /// Non-building read of the partition's published handle
    pub fn get(&self, partition_id: &str) -> Option<Resolution<V>> {
        self.cache.get(&partition_key(partition_id, &self.resource))
    }

    /// Drop the partition's entry, forcing reconstruction on the next request
    pub fn invalidate(&self, partition_id: &str) {
        self.cache.invalidate(&partition_key(partition_id, &self.resource));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use stratum_core::partition::{InMemoryPartitionDirectory, PartitionError};

    struct CountingDirectory {
        inner: InMemoryPartitionDirectory,
        reads: AtomicU32,
    }

    impl CountingDirectory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: InMemoryPartitionDirectory::new(),
                reads: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl PartitionDirectory for CountingDirectory {
        async fn get_partition(&self, partition_id: &str) -> Result<PartitionInfo, PartitionError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_partition(partition_id).await
        }

        async fn list_partitions(&self) -> Result<Vec<String>, PartitionError> {
            self.inner.list_partitions().await
        }
    }

    struct TopicClient {
        endpoint: String,
    }

    async fn seeded_directory() -> Arc<CountingDirectory> {
        let directory = CountingDirectory::new();
        directory
            .inner
            .insert(PartitionInfo::new("acme").with_property("topic-endpoint", "amqps://acme"))
            .await;
        directory
    }

    #[tokio::test]
    async fn test_directory_read_once_per_construction() {
        let directory = seeded_directory().await;
        let clients: PartitionClients<TopicClient> =
            PartitionClients::new(Arc::clone(&directory) as Arc<dyn PartitionDirectory>, "topic");

        for _ in 0..3 {
            let client = clients
                .get_or_create("acme", |partition| async move {
                    Ok(TopicClient {
                        endpoint: partition.str_property("topic-endpoint")?.to_string(),
                    })
                })
                .await
                .unwrap();
            assert_eq!(client.endpoint, "amqps://acme");
        }

        assert_eq!(directory.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_partition_not_cached() {
        let directory = seeded_directory().await;
        let clients: PartitionClients<TopicClient> =
            PartitionClients::new(Arc::clone(&directory) as Arc<dyn PartitionDirectory>, "topic");

        let result = clients
            .get_or_create("ghost", |partition| async move {
                Ok(TopicClient {
                    endpoint: partition.str_property("topic-endpoint")?.to_string(),
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(CacheError::Partition(PartitionError::NotFound(_)))
        ));
        assert!(clients.get("ghost").is_none());
        // the directory is consulted again on the next attempt
        let _ = clients
            .get_or_create("ghost", |partition| async move {
                Ok(TopicClient {
                    endpoint: partition.str_property("topic-endpoint")?.to_string(),
                })
            })
            .await;
        assert_eq!(directory.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_partition_id_fails_before_lookup() {
        let directory = seeded_directory().await;
        let clients: PartitionClients<TopicClient> =
            PartitionClients::new(Arc::clone(&directory) as Arc<dyn PartitionDirectory>, "topic");

        let result = clients
            .get_or_create("bad}name", |_partition| async move {
                Ok(TopicClient {
                    endpoint: String::new(),
                })
            })
            .await;

        assert!(matches!(result, Err(CacheError::Validation(_))));
        assert_eq!(directory.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_degraded_partition_client() {
        let directory = seeded_directory().await;
        let clients: PartitionClients<TopicClient> =
            PartitionClients::new(Arc::clone(&directory) as Arc<dyn PartitionDirectory>, "topic");

        let resolution = clients
            .get_or_create_degraded(
                "ghost",
                |partition| async move {
                    Ok(TopicClient {
                        endpoint: partition.str_property("topic-endpoint")?.to_string(),
                    })
                },
                || TopicClient {
                    endpoint: String::new(),
                },
            )
            .await
            .unwrap();

        assert!(resolution.is_degraded());
        assert!(clients.get("ghost").unwrap().is_degraded());
    }
}
