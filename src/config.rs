// src/config.rs
use log::warn;
use std::env;

/// Tunables for the resolution engine.
///
/// The composite weights and the acceptance threshold are empirically chosen
/// constants, not derived from a model. They were calibrated on
/// German/French/Italian Swiss company names; recalibrate against a labeled
/// dataset before using them for another locale.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Composite score (0-100) at which a fuzzy candidate is accepted.
    /// Inclusive: a candidate scoring exactly at the threshold matches.
    pub score_threshold: f64,
    pub weight_holistic: f64,
    pub weight_token_sort: f64,
    pub weight_partial: f64,
    /// Hard cap on the blocking union passed to the scorer.
    pub max_candidates: usize,
    /// Capacity of the in-process LRU tier.
    pub lru_capacity: usize,
    pub positive_ttl_hours: i64,
    pub negative_ttl_hours: i64,
    /// Concurrency ceiling for `resolve_batch`.
    pub max_concurrent_lookups: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            score_threshold: 85.0,
            weight_holistic: 0.5,
            weight_token_sort: 0.3,
            weight_partial: 0.2,
            max_candidates: 30,
            lru_capacity: 10_000,
            positive_ttl_hours: 24,
            negative_ttl_hours: 24,
            max_concurrent_lookups: 10,
        }
    }
}

impl ResolverConfig {
    /// Builds a config from `RESOLVER_*` environment variables, falling back
    /// to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            score_threshold: env_parse("RESOLVER_SCORE_THRESHOLD", defaults.score_threshold),
            weight_holistic: env_parse("RESOLVER_WEIGHT_HOLISTIC", defaults.weight_holistic),
            weight_token_sort: env_parse("RESOLVER_WEIGHT_TOKEN_SORT", defaults.weight_token_sort),
            weight_partial: env_parse("RESOLVER_WEIGHT_PARTIAL", defaults.weight_partial),
            max_candidates: env_parse("RESOLVER_MAX_CANDIDATES", defaults.max_candidates),
            lru_capacity: env_parse("RESOLVER_LRU_CAPACITY", defaults.lru_capacity),
            positive_ttl_hours: env_parse("RESOLVER_POSITIVE_TTL_HOURS", defaults.positive_ttl_hours),
            negative_ttl_hours: env_parse("RESOLVER_NEGATIVE_TTL_HOURS", defaults.negative_ttl_hours),
            max_concurrent_lookups: env_parse(
                "RESOLVER_MAX_CONCURRENT_LOOKUPS",
                defaults.max_concurrent_lookups,
            ),
        };
        config.warn_on_suspect_values();
        config
    }

    fn warn_on_suspect_values(&self) {
        let weight_sum = self.weight_holistic + self.weight_token_sort + self.weight_partial;
        if (weight_sum - 1.0).abs() > 0.01 {
            warn!(
                "Composite weights sum to {:.3}, expected 1.0; scores will drift off the 0-100 scale",
                weight_sum
            );
        }
        if self.max_candidates == 0 {
            warn!("RESOLVER_MAX_CANDIDATES is 0; every lookup will resolve to NONE");
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
