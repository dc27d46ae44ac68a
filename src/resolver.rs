// src/resolver.rs
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::{CacheStore, MatchCache};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::index::{MetricStore, ReferenceIndex};
use crate::matching::normalize::normalize;
use crate::matching::scoring::score_and_select;
use crate::models::core::{MatchResult, ResolvedCompany};

/// Orchestrates one lookup:
/// normalize -> cache check -> [miss] retrieve -> score -> cache write ->
/// [matched] metric lookup. No retries inside a lookup; a store failure
/// surfaces as `ResolveError::StoreUnavailable` and the caller may retry.
///
/// All collaborators are injected so the engine can run against a synthetic
/// in-memory registry in tests as easily as against the production store.
pub struct Resolver {
    index: Arc<dyn ReferenceIndex>,
    metrics: Arc<dyn MetricStore>,
    cache: MatchCache,
    config: ResolverConfig,
    retrievals: AtomicU64,
}

impl Resolver {
    pub fn new(
        index: Arc<dyn ReferenceIndex>,
        metrics: Arc<dyn MetricStore>,
        cache_store: Arc<dyn CacheStore>,
        config: ResolverConfig,
    ) -> Self {
        let cache = MatchCache::new(
            config.lru_capacity,
            cache_store,
            config.positive_ttl_hours,
            config.negative_ttl_hours,
        );
        Self {
            index,
            metrics,
            cache,
            config,
            retrievals: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Number of candidate-retrieval invocations so far. Cache hits do not
    /// increment this, which is what the cache-consistency tests assert.
    pub fn retrieval_count(&self) -> u64 {
        self.retrievals.load(Ordering::Relaxed)
    }

    /// Resolves a raw company name to its best registry match, or a clean
    /// `NONE` result when nothing clears the threshold.
    pub async fn resolve(&self, raw_name: &str) -> Result<MatchResult, ResolveError> {
        let normalized = normalize(raw_name);
        if normalized.is_empty() {
            debug!("'{}' normalized to empty; resolving to NONE", raw_name);
            return Ok(MatchResult::none());
        }

        if let Some(entry) = self.cache.get(&normalized).await {
            debug!(
                "Cache hit for '{}' ({})",
                normalized,
                if entry.is_negative() { "negative" } else { "positive" }
            );
            return Ok(entry.result.unwrap_or_else(MatchResult::none));
        }

        self.retrievals.fetch_add(1, Ordering::Relaxed);
        let candidates = self
            .index
            .candidates(&normalized, self.config.max_candidates)
            .await?;
        debug!(
            "Retrieved {} candidates for '{}'",
            candidates.len(),
            normalized
        );

        let result = score_and_select(&normalized, &candidates, &self.config);
        let cached = if result.is_match() {
            Some(result.clone())
        } else {
            None
        };
        self.cache.put(&normalized, cached).await;
        Ok(result)
    }

    /// `resolve`, plus the most recent metric value when a match was found.
    pub async fn resolve_with_metric(
        &self,
        raw_name: &str,
    ) -> Result<ResolvedCompany, ResolveError> {
        let result = self.resolve(raw_name).await?;
        let metric = match result.entity_id {
            Some(entity_id) => self.metrics.latest_metric(entity_id).await?,
            None => None,
        };
        Ok(ResolvedCompany { result, metric })
    }

    /// Resolves a batch of names with a bounded concurrency ceiling, e.g.
    /// every company mentioned in one digest. Results are keyed by the input
    /// name; ordering across the batch is not guaranteed. Names whose lookup
    /// fails on the store are logged and omitted so one unreachable shard
    /// does not sink the whole digest.
    pub async fn resolve_batch(&self, names: &[String]) -> HashMap<String, ResolvedCompany> {
        let mut resolved = HashMap::new();
        for chunk in names.chunks(self.config.max_concurrent_lookups.max(1)) {
            let lookups = chunk
                .iter()
                .map(|name| async move { (name.as_str(), self.resolve_with_metric(name).await) });
            for (name, outcome) in futures::future::join_all(lookups).await {
                match outcome {
                    Ok(company) => {
                        resolved.insert(name.to_string(), company);
                    }
                    Err(e) => {
                        warn!("Lookup failed for '{}': {}", name, e);
                    }
                }
            }
        }
        resolved
    }
}
