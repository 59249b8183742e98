//! Expiry-aware credential caching.
//!
//! Security tokens are expensive to mint and short-lived. The cache keeps
//! one token per audience and serves it until a configurable margin before
//! its expiry, so a token handed to a caller is never about to lapse
//! mid-use. Refreshes for one audience collapse into a single upstream
//! call, the same single-flight discipline the client cache applies.

use crate::error::CacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use stratum_core::validation::require_non_empty;
use tokio::sync::Mutex;
use tracing::debug;

/// A bearer token with an absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token expiring at `expires_at`
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// The token value
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Absolute expiry timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True when the token expires within the given lead time (or already
    /// has)
    pub fn expires_within(&self, margin: Duration) -> bool {
        match (self.expires_at - Utc::now()).to_std() {
            Ok(remaining) => remaining <= margin,
            Err(_) => true,
        }
    }
}

// Tokens end up in log lines through errors and debug output; never print
// the secret itself.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Upstream credential provider
///
/// Implemented against the deployment's identity endpoint (managed
/// identity, workload identity, client credentials, ...).
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Mint a fresh token for `audience`
    async fn fetch_token(&self, audience: &str) -> CacheResult<AccessToken>;
}

/// Credential cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCacheConfig {
    /// Lead time before expiry at which a cached token is refreshed
    pub refresh_margin: Duration,
}

impl Default for CredentialCacheConfig {
    fn default() -> Self {
        Self {
            refresh_margin: Duration::from_secs(120),
        }
    }
}

impl CredentialCacheConfig {
    /// Create a config with the default refresh margin
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh margin
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Load configuration from environment variables
    ///
    /// `STRATUM_TOKEN_REFRESH_MARGIN_SECS` overrides the refresh margin.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secs) = std::env::var("STRATUM_TOKEN_REFRESH_MARGIN_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.refresh_margin = Duration::from_secs(secs);
            }
        }
        config
    }
}

/// Per-audience security-token cache.
///
/// Typically a per-process singleton, constructed once and passed by handle
/// to consumers. A token is served from cache strictly before
/// `expiry - margin`; at or past that point the upstream source is called
/// and the entry superseded in place. Upstream failures propagate - a token
/// past its margin is never silently reused.
pub struct CredentialCache {
    source: Arc<dyn TokenSource>,
    refresh_margin: Duration,
    slots: RwLock<HashMap<String, Arc<Mutex<Option<AccessToken>>>>>,
}

impl CredentialCache {
    /// Create a cache with the default configuration
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self::with_config(source, CredentialCacheConfig::default())
    }

    /// Create a cache with an explicit configuration
    pub fn with_config(source: Arc<dyn TokenSource>, config: CredentialCacheConfig) -> Self {
        Self {
            source,
            refresh_margin: config.refresh_margin,
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, audience: &str) -> Arc<Mutex<Option<AccessToken>>> {
        if let Some(slot) = self.slots.read().get(audience) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(
            slots
                .entry(audience.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None))),
        )
    }

    /// Return a token for `audience`, refreshing if absent or stale.
    pub async fn token(&self, audience: &str) -> CacheResult<AccessToken> {
        let audience = require_non_empty(Some(audience), "audience")?;

        let slot = self.slot(audience);
        let mut guard = slot.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.expires_within(self.refresh_margin) {
                return Ok(token.clone());
            }
            debug!(audience, "cached token within refresh margin, refreshing");
        }

        let fresh = self.source.fetch_token(audience).await?;
        *guard = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the cached token for `audience`
    pub fn invalidate(&self, audience: &str) {
        self.slots.write().remove(audience);
    }

    /// Drop all cached tokens
    pub fn clear(&self) {
        self.slots.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedSource {
        /// Lifetime per fetch, last entry repeated
        lifetimes: Vec<chrono::Duration>,
        fetches: AtomicU32,
    }

    impl FixedSource {
        fn with_lifetime(lifetime: chrono::Duration) -> Arc<Self> {
            Self::with_lifetimes(vec![lifetime])
        }

        fn with_lifetimes(lifetimes: Vec<chrono::Duration>) -> Arc<Self> {
            Arc::new(Self {
                lifetimes,
                fetches: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TokenSource for FixedSource {
        async fn fetch_token(&self, audience: &str) -> CacheResult<AccessToken> {
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst) as usize;
            let lifetime = self
                .lifetimes
                .get(fetch)
                .or_else(|| self.lifetimes.last())
                .copied()
                .unwrap_or_else(|| chrono::Duration::hours(1));
            Ok(AccessToken::new(
                format!("token-{audience}-{fetch}"),
                Utc::now() + lifetime,
            ))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn fetch_token(&self, _audience: &str) -> CacheResult<AccessToken> {
            Err(CacheError::Auth("identity endpoint unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fresh_token_served_from_cache() {
        let source = FixedSource::with_lifetime(chrono::Duration::hours(1));
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn TokenSource>);

        let first = cache.token("storage").await.unwrap();
        let second = cache.token("storage").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_token_refreshed_then_served_from_cache() {
        // first token expires inside the margin, its replacement well outside
        let source = FixedSource::with_lifetimes(vec![
            chrono::Duration::seconds(30),
            chrono::Duration::hours(1),
        ]);
        let config = CredentialCacheConfig::new().with_refresh_margin(Duration::from_secs(60));
        let cache =
            CredentialCache::with_config(Arc::clone(&source) as Arc<dyn TokenSource>, config);

        let first = cache.token("storage").await.unwrap();
        let second = cache.token("storage").await.unwrap();
        let third = cache.token("storage").await.unwrap();

        // the stale token triggered exactly one refresh, after which the
        // replacement is served from cache
        assert_ne!(first.secret(), second.secret());
        assert_eq!(second, third);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_audiences_are_independent() {
        let source = FixedSource::with_lifetime(chrono::Duration::hours(1));
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn TokenSource>);

        let storage = cache.token("storage").await.unwrap();
        let topic = cache.token("topic").await.unwrap();

        assert_ne!(storage.secret(), topic.secret());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let cache = CredentialCache::new(Arc::new(FailingSource));
        let result = cache.token("storage").await;
        assert!(matches!(result, Err(CacheError::Auth(_))));
    }

    #[tokio::test]
    async fn test_empty_audience_rejected() {
        let cache = CredentialCache::new(Arc::new(FailingSource));
        let result = cache.token("  ").await;
        assert!(matches!(result, Err(CacheError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let source = FixedSource::with_lifetime(chrono::Duration::hours(1));
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn TokenSource>);

        cache.token("storage").await.unwrap();
        cache.invalidate("storage");
        cache.token("storage").await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expires_within_margin() {
        let soon = AccessToken::new("t", Utc::now() + chrono::Duration::seconds(30));
        assert!(soon.expires_within(Duration::from_secs(60)));
        assert!(!soon.expires_within(Duration::from_secs(5)));

        let expired = AccessToken::new("t", Utc::now() - chrono::Duration::seconds(5));
        assert!(expired.expires_within(Duration::from_secs(0)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AccessToken::new("very-secret", Utc::now());
        let formatted = format!("{token:?}");
        assert!(!formatted.contains("very-secret"));
        assert!(formatted.contains("<redacted>"));
    }

    #[test]
    fn test_config_default_margin_is_not_zero() {
        let config = CredentialCacheConfig::default();
        assert!(config.refresh_margin > Duration::ZERO);
    }
}
