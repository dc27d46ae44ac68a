// src/index/mod.rs
use async_trait::async_trait;

use crate::error::ResolveError;
use crate::models::core::ReferenceEntity;

pub mod memory;
pub mod postgres;

pub const BLOCK4_WIDTH: usize = 4;
pub const BLOCK3_WIDTH: usize = 3;

// Retrieval priority ranks. Exact hits sort first, trigram-only hits last;
// block3 slots between phonetic and trigram as the loosest prefix net.
// Ordering is retrieval prioritization only: the scorer re-scores every
// candidate regardless of rank.
pub(crate) const RANK_EXACT: u8 = 0;
pub(crate) const RANK_BLOCK4: u8 = 1;
pub(crate) const RANK_PHONETIC: u8 = 2;
pub(crate) const RANK_BLOCK3: u8 = 3;
pub(crate) const RANK_TRIGRAM: u8 = 4;

/// Fixed-width prefix block of a normalized name, space-padded when the
/// name is shorter than the block.
pub fn block_key(normalized: &str, width: usize) -> String {
    let mut key: String = normalized.chars().take(width).collect();
    for _ in key.chars().count()..width {
        key.push(' ');
    }
    key
}

/// Read-only queryable view over one registry snapshot. Implementations are
/// shared across concurrent lookups without locking; the snapshot is
/// replaced wholesale when the source registry changes.
#[async_trait]
pub trait ReferenceIndex: Send + Sync {
    /// Bounded union of the exact/block/phonetic/trigram blocking
    /// strategies, deduplicated by entity and ordered by retrieval priority.
    /// Never returns more than `max_candidates` entities; an empty result is
    /// not an error.
    async fn candidates(
        &self,
        normalized: &str,
        max_candidates: usize,
    ) -> Result<Vec<ReferenceEntity>, ResolveError>;
}

/// Point reads against the time-stamped metric table.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Most recent metric value for the entity, or `None` when it has no
    /// metric history.
    async fn latest_metric(&self, entity_id: i64) -> Result<Option<f64>, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_keys_are_space_padded() {
        assert_eq!(block_key("creditreform", BLOCK4_WIDTH), "cred");
        assert_eq!(block_key("ubs", BLOCK4_WIDTH), "ubs ");
        assert_eq!(block_key("ab", BLOCK3_WIDTH), "ab ");
        assert_eq!(block_key("", BLOCK3_WIDTH), "   ");
    }
}
