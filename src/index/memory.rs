// src/index/memory.rs
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;

use crate::error::ResolveError;
use crate::index::{
    block_key, MetricStore, ReferenceIndex, BLOCK3_WIDTH, BLOCK4_WIDTH, RANK_BLOCK3, RANK_BLOCK4,
    RANK_EXACT, RANK_PHONETIC, RANK_TRIGRAM,
};
use crate::matching::normalize::normalize;
use crate::matching::phonetic::cologne_code;
use crate::matching::trigram::{min_shared_trigrams, trigrams};
use crate::models::core::{MetricRecord, ReferenceEntity};

/// In-memory registry snapshot: hash maps keyed by exact name, prefix
/// blocks and phonetic code, plus an inverted trigram map. Built once from
/// the raw registry rows; every derived field is recomputed here so a
/// rebuild is always wholesale.
pub struct InMemoryIndex {
    entities: Vec<ReferenceEntity>,
    by_exact: HashMap<String, Vec<usize>>,
    by_block4: HashMap<String, Vec<usize>>,
    by_block3: HashMap<String, Vec<usize>>,
    by_phonetic: HashMap<String, Vec<usize>>,
    by_trigram: HashMap<String, Vec<usize>>,
    metrics: HashMap<i64, Vec<MetricRecord>>,
}

impl InMemoryIndex {
    /// Builds the snapshot from `(entity_id, original_name)` rows and the
    /// metric history. Rows whose name normalizes to the empty string are
    /// unreachable by any lookup and are dropped.
    pub fn build(
        rows: impl IntoIterator<Item = (i64, String)>,
        metric_rows: Vec<MetricRecord>,
    ) -> Self {
        let mut index = InMemoryIndex {
            entities: Vec::new(),
            by_exact: HashMap::new(),
            by_block4: HashMap::new(),
            by_block3: HashMap::new(),
            by_phonetic: HashMap::new(),
            by_trigram: HashMap::new(),
            metrics: HashMap::new(),
        };

        for (entity_id, original_name) in rows {
            let normalized_name = normalize(&original_name);
            if normalized_name.is_empty() {
                debug!(
                    "Dropping entity {} ('{}'): name normalizes to empty",
                    entity_id, original_name
                );
                continue;
            }
            let entity = ReferenceEntity {
                entity_id,
                block4: block_key(&normalized_name, BLOCK4_WIDTH),
                block3: block_key(&normalized_name, BLOCK3_WIDTH),
                phonetic_code: cologne_code(&normalized_name),
                original_name,
                normalized_name,
            };
            let idx = index.entities.len();
            index
                .by_exact
                .entry(entity.normalized_name.clone())
                .or_default()
                .push(idx);
            index
                .by_block4
                .entry(entity.block4.clone())
                .or_default()
                .push(idx);
            index
                .by_block3
                .entry(entity.block3.clone())
                .or_default()
                .push(idx);
            if !entity.phonetic_code.is_empty() {
                index
                    .by_phonetic
                    .entry(entity.phonetic_code.clone())
                    .or_default()
                    .push(idx);
            }
            for gram in trigrams(&entity.normalized_name) {
                index.by_trigram.entry(gram).or_default().push(idx);
            }
            index.entities.push(entity);
        }

        for record in metric_rows {
            index.metrics.entry(record.entity_id).or_default().push(record);
        }
        for history in index.metrics.values_mut() {
            history.sort_by_key(|r| r.as_of_date);
        }

        info!(
            "Built in-memory reference index: {} entities, {} distinct trigrams",
            index.entities.len(),
            index.by_trigram.len()
        );
        index
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn ranked_candidates(&self, normalized: &str, max_candidates: usize) -> Vec<ReferenceEntity> {
        if normalized.is_empty() || max_candidates == 0 {
            return Vec::new();
        }

        // idx -> best (lowest) rank seen across strategies
        let mut ranks: HashMap<usize, u8> = HashMap::new();
        fn note(ranks: &mut HashMap<usize, u8>, idx: usize, rank: u8) {
            let entry = ranks.entry(idx).or_insert(rank);
            if rank < *entry {
                *entry = rank;
            }
        }

        if let Some(hits) = self.by_exact.get(normalized) {
            for &idx in hits {
                note(&mut ranks, idx, RANK_EXACT);
            }
        }
        if let Some(hits) = self.by_block4.get(&block_key(normalized, BLOCK4_WIDTH)) {
            for &idx in hits {
                note(&mut ranks, idx, RANK_BLOCK4);
            }
        }
        let code = cologne_code(normalized);
        if !code.is_empty() {
            if let Some(hits) = self.by_phonetic.get(&code) {
                for &idx in hits {
                    note(&mut ranks, idx, RANK_PHONETIC);
                }
            }
        }
        if let Some(hits) = self.by_block3.get(&block_key(normalized, BLOCK3_WIDTH)) {
            for &idx in hits {
                note(&mut ranks, idx, RANK_BLOCK3);
            }
        }

        let input_grams = trigrams(normalized);
        let needed = min_shared_trigrams(input_grams.len());
        let mut overlap: HashMap<usize, usize> = HashMap::new();
        for gram in &input_grams {
            if let Some(hits) = self.by_trigram.get(gram) {
                for &idx in hits {
                    *overlap.entry(idx).or_insert(0) += 1;
                }
            }
        }
        for (idx, shared) in overlap {
            if shared >= needed {
                note(&mut ranks, idx, RANK_TRIGRAM);
            }
        }

        let mut ordered: Vec<(u8, i64, usize)> = ranks
            .into_iter()
            .map(|(idx, rank)| (rank, self.entities[idx].entity_id, idx))
            .collect();
        ordered.sort_unstable();
        ordered.truncate(max_candidates);
        ordered
            .into_iter()
            .map(|(_, _, idx)| self.entities[idx].clone())
            .collect()
    }
}

#[async_trait]
impl ReferenceIndex for InMemoryIndex {
    async fn candidates(
        &self,
        normalized: &str,
        max_candidates: usize,
    ) -> Result<Vec<ReferenceEntity>, ResolveError> {
        Ok(self.ranked_candidates(normalized, max_candidates))
    }
}

#[async_trait]
impl MetricStore for InMemoryIndex {
    async fn latest_metric(&self, entity_id: i64) -> Result<Option<f64>, ResolveError> {
        Ok(self
            .metrics
            .get(&entity_id)
            .and_then(|history| history.last())
            .map(|record| record.metric_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn build(names: &[(i64, &str)]) -> InMemoryIndex {
        InMemoryIndex::build(
            names.iter().map(|(id, n)| (*id, n.to_string())),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn exact_hit_ranks_first() {
        let index = build(&[
            (1, "Creditreform AG"),
            (2, "Creditreform Eschborn GmbH"),
            (3, "Creda GmbH"),
        ]);
        let candidates = index.candidates("creditreform", 30).await.unwrap();
        assert_eq!(candidates[0].entity_id, 1);
        assert!(candidates.len() >= 2);
    }

    #[tokio::test]
    async fn phonetic_variant_is_retrieved() {
        let index = build(&[(1, "Meyer AG"), (2, "Zimmermann AG")]);
        let candidates = index.candidates("maier", 30).await.unwrap();
        assert!(candidates.iter().any(|c| c.entity_id == 1));
        assert!(!candidates.iter().any(|c| c.entity_id == 2));
    }

    #[tokio::test]
    async fn trigram_overlap_respects_dynamic_minimum() {
        // "zzabcdezz" shares exactly three trigrams with "abcdefgh"
        // ("abc", "bcd", "cde"); "zzabczz" shares only one ("abc").
        let index = build(&[(1, "zzabcdezz"), (2, "zzabczz")]);
        let candidates = index.candidates("abcdefgh", 30).await.unwrap();
        assert!(candidates.iter().any(|c| c.entity_id == 1));
        assert!(!candidates.iter().any(|c| c.entity_id == 2));
    }

    #[tokio::test]
    async fn result_is_capped_and_deduplicated() {
        let rows: Vec<(i64, String)> = (0..50)
            .map(|i| (i, format!("Creditreform Filiale {} AG", i)))
            .collect();
        let index = InMemoryIndex::build(rows, Vec::new());
        let candidates = index.candidates("creditreform filiale 7", 30).await.unwrap();
        assert!(candidates.len() <= 30);
        let mut ids: Vec<i64> = candidates.iter().map(|c| c.entity_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), candidates.len());
    }

    #[tokio::test]
    async fn empty_input_returns_no_candidates() {
        let index = build(&[(1, "Anything AG")]);
        assert!(index.candidates("", 30).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_metric_reads_newest_row() {
        let metrics = vec![
            MetricRecord {
                entity_id: 42,
                metric_value: 10.0,
                as_of_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            MetricRecord {
                entity_id: 42,
                metric_value: 12.5,
                as_of_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            },
        ];
        let index = InMemoryIndex::build(vec![(42, "Credit Suisse AG".to_string())], metrics);
        assert_eq!(index.latest_metric(42).await.unwrap(), Some(12.5));
        assert_eq!(index.latest_metric(7).await.unwrap(), None);
    }
}
