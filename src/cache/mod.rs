// src/cache/mod.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use lru::LruCache;
use std::num::NonZero;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::core::MatchResult;

pub mod memory_store;
pub mod postgres_store;

pub use memory_store::InMemoryCacheStore;
pub use postgres_store::PostgresCacheStore;

/// One cache entry, keyed by the normalized name. `result == None` is the
/// explicit negative marker: the name was looked up and confirmed not found.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CachedMatch {
    pub result: Option<MatchResult>,
    pub cached_at: DateTime<Utc>,
}

impl CachedMatch {
    pub fn is_negative(&self) -> bool {
        self.result.is_none()
    }
}

/// Durable keyed tier of the cache. Failures here must never fail a lookup;
/// `MatchCache` degrades them to misses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, normalized: &str) -> Result<Option<CachedMatch>>;
    async fn put(&self, normalized: &str, entry: &CachedMatch, ttl: Duration) -> Result<()>;
}

/// Two-tier lookup cache: a bounded in-process LRU in front of a persistent
/// TTL store. The LRU tier is exclusive to this process and never persisted;
/// the store may be shared across restarts. Expired entries are treated as
/// absent in both tiers, never served.
pub struct MatchCache {
    lru: Mutex<LruCache<String, CachedMatch>>,
    store: Arc<dyn CacheStore>,
    positive_ttl: Duration,
    negative_ttl: Duration,
    lru_hits: AtomicU64,
    store_hits: AtomicU64,
    misses: AtomicU64,
}

impl MatchCache {
    pub fn new(
        capacity: usize,
        store: Arc<dyn CacheStore>,
        positive_ttl_hours: i64,
        negative_ttl_hours: i64,
    ) -> Self {
        Self {
            lru: Mutex::new(LruCache::new(
                NonZero::new(capacity.max(1)).expect("capacity clamped to >= 1"),
            )),
            store,
            positive_ttl: Duration::hours(positive_ttl_hours),
            negative_ttl: Duration::hours(negative_ttl_hours),
            lru_hits: AtomicU64::new(0),
            store_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn ttl_for(&self, entry: &CachedMatch) -> Duration {
        if entry.is_negative() {
            self.negative_ttl
        } else {
            self.positive_ttl
        }
    }

    fn is_fresh(&self, entry: &CachedMatch) -> bool {
        Utc::now() - entry.cached_at < self.ttl_for(entry)
    }

    /// Checks both tiers in order. `None` means miss; the caller cannot
    /// distinguish "never looked up" from "expired". A persistent-tier hit
    /// backfills the LRU.
    pub async fn get(&self, normalized: &str) -> Option<CachedMatch> {
        {
            let mut lru = self.lru.lock().await;
            if let Some(entry) = lru.get(normalized) {
                if self.is_fresh(entry) {
                    self.lru_hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.clone());
                }
                lru.pop(normalized);
            }
        }

        match self.store.get(normalized).await {
            Ok(Some(entry)) if self.is_fresh(&entry) => {
                self.store_hits.fetch_add(1, Ordering::Relaxed);
                self.lru
                    .lock()
                    .await
                    .put(normalized.to_string(), entry.clone());
                Some(entry)
            }
            Ok(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(
                    "Cache store read failed for '{}': {}. Treating as miss.",
                    normalized, e
                );
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Writes a fresh result to both tiers. `None` records the mandatory
    /// negative entry so unresolved names do not re-trigger retrieval within
    /// the TTL window.
    pub async fn put(&self, normalized: &str, result: Option<MatchResult>) {
        let entry = CachedMatch {
            result,
            cached_at: Utc::now(),
        };
        self.lru
            .lock()
            .await
            .put(normalized.to_string(), entry.clone());
        let ttl = self.ttl_for(&entry);
        if let Err(e) = self.store.put(normalized, &entry, ttl).await {
            warn!(
                "Cache store write failed for '{}': {}. Entry kept in LRU tier only.",
                normalized, e
            );
        } else {
            debug!(
                "Cached {} entry for '{}'",
                if entry.is_negative() { "negative" } else { "positive" },
                normalized
            );
        }
    }

    /// (LRU hits, persistent-store hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.lru_hits.load(Ordering::Relaxed),
            self.store_hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub async fn lru_len(&self) -> usize {
        self.lru.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::{MatchType, MatchResult};

    fn positive_result(entity_id: i64) -> MatchResult {
        MatchResult {
            entity_id: Some(entity_id),
            matched_name: Some("Creditreform AG".to_string()),
            score: 97,
            match_type: MatchType::Fuzzy,
        }
    }

    fn cache_with(capacity: usize, pos_ttl: i64, neg_ttl: i64) -> MatchCache {
        MatchCache::new(
            capacity,
            Arc::new(InMemoryCacheStore::new()),
            pos_ttl,
            neg_ttl,
        )
    }

    #[tokio::test]
    async fn positive_roundtrip() {
        let cache = cache_with(10, 24, 24);
        cache.put("creditreform", Some(positive_result(1))).await;
        let entry = cache.get("creditreform").await.expect("expected a hit");
        assert_eq!(entry.result, Some(positive_result(1)));
        let (lru_hits, _, _) = cache.stats();
        assert_eq!(lru_hits, 1);
    }

    #[tokio::test]
    async fn negative_entry_is_a_hit() {
        let cache = cache_with(10, 24, 24);
        cache.put("unknown name", None).await;
        let entry = cache.get("unknown name").await.expect("expected a hit");
        assert!(entry.is_negative());
    }

    #[tokio::test]
    async fn expired_entries_are_never_served() {
        // Zero-hour TTLs expire entries immediately in both tiers.
        let cache = cache_with(10, 0, 0);
        cache.put("creditreform", Some(positive_result(1))).await;
        cache.put("unknown name", None).await;
        assert!(cache.get("creditreform").await.is_none());
        assert!(cache.get("unknown name").await.is_none());
    }

    #[tokio::test]
    async fn lru_eviction_falls_back_to_store_and_backfills() {
        let cache = cache_with(1, 24, 24);
        cache.put("alpha", Some(positive_result(1))).await;
        cache.put("beta", Some(positive_result(2))).await;
        assert_eq!(cache.lru_len().await, 1);

        // "alpha" was evicted from the LRU tier but survives in the store.
        let entry = cache.get("alpha").await.expect("expected a store hit");
        assert_eq!(entry.result, Some(positive_result(1)));
        let (_, store_hits, _) = cache.stats();
        assert_eq!(store_hits, 1);
    }

    #[tokio::test]
    async fn unknown_key_is_a_miss() {
        let cache = cache_with(10, 24, 24);
        assert!(cache.get("never seen").await.is_none());
        let (_, _, misses) = cache.stats();
        assert_eq!(misses, 1);
    }
}
