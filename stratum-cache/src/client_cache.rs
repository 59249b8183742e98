//! Keyed client-handle cache with single-flight construction.
//!
//! Entries are never expired or evicted on their own: partition topology is
//! effectively static within a process lifetime, so a handle built once
//! stays valid until the cache is dropped or the key is invalidated.

use crate::error::CacheResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use stratum_core::validation::require_non_empty;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Composite cache key for one partition's client of one resource kind.
pub fn partition_key(partition_id: &str, resource: &str) -> String {
    format!("{partition_id}-{resource}")
}

enum Slot<V> {
    /// No construction has succeeded yet
    Vacant,
    /// A healthy client handle
    Ready(Arc<V>),
    /// A cached placeholder from a failed construction; replaced by a real
    /// client as soon as a later build succeeds
    Degraded(Arc<V>),
}

/// Outcome of a cache lookup: a healthy client or a cached placeholder.
#[derive(Debug)]
pub enum Resolution<V> {
    /// A client built from real partition configuration
    Ready(Arc<V>),
    /// A degraded placeholder standing in for an unavailable backend
    Degraded(Arc<V>),
}

impl<V> Resolution<V> {
    /// The client handle, healthy or degraded
    pub fn handle(&self) -> &Arc<V> {
        match self {
            Resolution::Ready(handle) | Resolution::Degraded(handle) => handle,
        }
    }

    /// Consume the resolution, returning the handle
    pub fn into_handle(self) -> Arc<V> {
        match self {
            Resolution::Ready(handle) | Resolution::Degraded(handle) => handle,
        }
    }

    /// Whether this is a placeholder rather than a healthy client
    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded(_))
    }
}

impl<V> Clone for Resolution<V> {
    fn clone(&self) -> Self {
        match self {
            Resolution::Ready(handle) => Resolution::Ready(Arc::clone(handle)),
            Resolution::Degraded(handle) => Resolution::Degraded(Arc::clone(handle)),
        }
    }
}

/// Concurrent, lazily-populated cache of client handles.
///
/// For any key, arbitrarily many concurrent first-time callers collapse
/// into a single invocation of the builder; every caller observes the same
/// published handle. A failed build leaves the key absent, so a later call
/// may retry - there is no negative caching unless the degraded-placeholder
/// variant is used explicitly.
pub struct ClientCache<V> {
    slots: RwLock<HashMap<String, Arc<Mutex<Slot<V>>>>>,
}

impl<V> Default for ClientCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ClientCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// One mutex per key: its lock is the single-flight discipline, held by
    /// whichever caller is currently building.
    fn slot(&self, key: &str) -> Arc<Mutex<Slot<V>>> {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Slot::Vacant))),
        )
    }

    /// Return the cached handle for `key`, building it on a miss.
    ///
    /// Exactly one concurrent caller runs `build`; the rest wait for the
    /// winner and receive the published handle. On failure the slot stays
    /// vacant and the next caller in line retries.
    pub async fn get_or_create<F, Fut>(&self, key: &str, build: F) -> CacheResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CacheResult<V>>,
    {
        require_non_empty(Some(key), "cache key")?;

        let slot = self.slot(key);
        let mut guard = slot.lock().await;
        if let Slot::Ready(handle) = &*guard {
            return Ok(Arc::clone(handle));
        }

        debug!(key, "client cache miss, constructing");
        let handle = Arc::new(build().await?);
        *guard = Slot::Ready(Arc::clone(&handle));
        Ok(handle)
    }

    /// Like [`get_or_create`](Self::get_or_create), but a failed build
    /// caches `placeholder()` as a degraded stand-in instead of failing.
    ///
    /// The placeholder is advisory, not sticky: every building call that
    /// reaches a degraded slot re-runs `build` and promotes the slot to
    /// ready on the first success. Repeated failures keep the original
    /// placeholder.
    pub async fn get_or_create_degraded<F, Fut, P>(
        &self,
        key: &str,
        build: F,
        placeholder: P,
    ) -> CacheResult<Resolution<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CacheResult<V>>,
        P: FnOnce() -> V,
    {
        require_non_empty(Some(key), "cache key")?;

        let slot = self.slot(key);
        let mut guard = slot.lock().await;
        if let Slot::Ready(handle) = &*guard {
            return Ok(Resolution::Ready(Arc::clone(handle)));
        }

        match build().await {
            Ok(value) => {
                let handle = Arc::new(value);
                *guard = Slot::Ready(Arc::clone(&handle));
                Ok(Resolution::Ready(handle))
            }
            Err(error) => {
                warn!(key, %error, "client construction failed, serving degraded placeholder");
                let handle = match &*guard {
                    Slot::Degraded(existing) => Arc::clone(existing),
                    _ => {
                        let fresh = Arc::new(placeholder());
                        *guard = Slot::Degraded(Arc::clone(&fresh));
                        fresh
                    }
                };
                Ok(Resolution::Degraded(handle))
            }
        }
    }

    /// Non-building read of whatever is currently published for `key`.
    ///
    /// A degraded placeholder is served as-is, without re-attempting
    /// construction. Returns `None` while a build is in flight.
    pub fn get(&self, key: &str) -> Option<Resolution<V>> {
        let slot = self.slots.read().get(key).cloned()?;
        let guard = slot.try_lock().ok()?;
        match &*guard {
            Slot::Ready(handle) => Some(Resolution::Ready(Arc::clone(handle))),
            Slot::Degraded(handle) => Some(Resolution::Degraded(Arc::clone(handle))),
            Slot::Vacant => None,
        }
    }

    /// Drop the entry for `key`, forcing reconstruction on the next request
    pub fn invalidate(&self, key: &str) {
        self.slots.write().remove(key);
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Whether a handle (healthy or degraded) is published for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of published entries
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| {
                matches!(
                    slot.try_lock().as_deref(),
                    Ok(Slot::Ready(_)) | Ok(Slot::Degraded(_))
                )
            })
            .count()
    }

    /// Whether no entries are published
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
