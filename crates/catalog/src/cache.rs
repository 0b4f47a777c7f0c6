//! Time-bounded catalog cache.
//!
//! Holds at most one [`CacheEntry`] behind a `tokio::sync::RwLock`. A
//! lookup serves the cached snapshot while it is fresh and goes upstream
//! once it has expired, replacing the entry wholesale. Fetch failures are
//! surfaced to the caller once, with no automatic retry and no new entry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use aureole_core::catalog::{CacheEntry, Catalog};
use aureole_core::types::Timestamp;

use crate::client::{CatalogClient, CatalogFetchError};

/// Default TTL: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// In-memory catalog cache with a fixed TTL.
///
/// Designed to be wrapped in `Arc` and shared across request handlers.
/// Concurrent lookups on an expired entry may each fetch; the last write
/// wins, which is benign since each fetch is a full snapshot.
pub struct CatalogCache {
    client: Arc<dyn CatalogClient>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl CatalogCache {
    pub fn new(client: Arc<dyn CatalogClient>, ttl: Duration) -> Self {
        Self {
            client,
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn with_default_ttl(client: Arc<dyn CatalogClient>) -> Self {
        Self::new(client, DEFAULT_TTL)
    }

    /// Return the catalog, fetching from upstream when the cache is empty
    /// or expired.
    pub async fn get(&self) -> Result<Catalog, CatalogFetchError> {
        self.get_at(chrono::Utc::now()).await
    }

    /// Like [`get`](Self::get) with an explicit clock, so expiry can be
    /// exercised deterministically.
    pub async fn get_at(&self, now: Timestamp) -> Result<Catalog, CatalogFetchError> {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if !entry.is_expired(now, self.ttl) {
                return Ok(entry.catalog.clone());
            }
        }

        // Miss or expired: fetch outside the lock, then replace wholesale.
        let catalog = match self.client.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed");
                return Err(e);
            }
        };

        tracing::debug!(
            total_items = catalog.total_items,
            "Catalog refreshed from upstream"
        );

        let mut slot = self.entry.write().await;
        *slot = Some(CacheEntry::new(catalog.clone(), now));
        Ok(catalog)
    }

    /// Whether a fresh entry currently exists at `now`.
    pub async fn is_fresh(&self, now: Timestamp) -> bool {
        self.entry
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| !entry.is_expired(now, self.ttl))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use aureole_core::catalog::CatalogItem;

    use super::*;

    /// Scripted upstream that counts fetches and can be told to fail.
    struct ScriptedClient {
        fetches: AtomicUsize,
        fail: AtomicBool,
    }

    impl ScriptedClient {
        fn ok() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            let client = Self::ok();
            client.fail.store(true, Ordering::SeqCst);
            client
        }

        fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogClient for ScriptedClient {
        async fn fetch_catalog(&self) -> Result<Catalog, CatalogFetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CatalogFetchError::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(Catalog::new(
                vec![CatalogItem::repository("augur", 1)],
                None,
            ))
        }
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_serves_the_cache() {
        let client = Arc::new(ScriptedClient::ok());
        let cache = CatalogCache::new(client.clone(), Duration::from_secs(60));

        let t0 = chrono::Utc::now();
        let first = cache.get_at(t0).await.unwrap();
        let second = cache
            .get_at(t0 + chrono::Duration::seconds(59))
            .await
            .unwrap();

        assert_eq!(client.fetch_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn lookup_at_ttl_boundary_refetches_once() {
        let client = Arc::new(ScriptedClient::ok());
        let cache = CatalogCache::new(client.clone(), Duration::from_secs(60));

        let t0 = chrono::Utc::now();
        cache.get_at(t0).await.unwrap();
        // `now - fetched_at == TTL` is expired.
        cache
            .get_at(t0 + chrono::Duration::seconds(60))
            .await
            .unwrap();

        assert_eq!(client.fetch_count(), 2);
        // The replacement entry is fresh again.
        assert!(cache.is_fresh(t0 + chrono::Duration::seconds(61)).await);
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_once_and_leaves_no_entry() {
        let client = Arc::new(ScriptedClient::failing());
        let cache = CatalogCache::new(client.clone(), Duration::from_secs(60));

        let t0 = chrono::Utc::now();
        let err = cache.get_at(t0).await.unwrap_err();
        assert!(matches!(err, CatalogFetchError::Api { status: 500, .. }));

        assert!(!cache.is_fresh(t0).await);
        // No retry happened behind the caller's back.
        assert_eq!(client.fetch_count(), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_not_resurrected_by_a_failed_refresh() {
        let client = Arc::new(ScriptedClient::ok());
        let cache = CatalogCache::new(client.clone(), Duration::from_secs(60));

        let t0 = chrono::Utc::now();
        cache.get_at(t0).await.unwrap();

        client.set_failing(true);
        let expired = t0 + chrono::Duration::seconds(60);
        let err = cache.get_at(expired).await.unwrap_err();
        assert!(matches!(err, CatalogFetchError::Api { status: 500, .. }));

        // The stale entry was not handed back as a fallback.
        assert!(!cache.is_fresh(expired).await);
        assert_eq!(client.fetch_count(), 2);
    }
}
