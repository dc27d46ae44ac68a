// src/index/postgres.rs

//! Postgres-backed reference index and metric store.
//!
//! Expected schema (populated by the offline snapshot-rebuild job):
//!
//!   company_reference(entity_id bigint primary key, original_name text,
//!                     normalized_name text, block4 text, block3 text,
//!                     phonetic_code text)
//!   company_trigram(trigram text, entity_id bigint)
//!   company_metric(entity_id bigint, metric_value double precision,
//!                  as_of_date date)
//!
//! with indexes on normalized_name, block4, block3, phonetic_code and
//! company_trigram(trigram).

use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_postgres::Row;

use crate::error::ResolveError;
use crate::index::{
    block_key, MetricStore, ReferenceIndex, BLOCK3_WIDTH, BLOCK4_WIDTH, RANK_BLOCK3, RANK_BLOCK4,
    RANK_EXACT, RANK_PHONETIC, RANK_TRIGRAM,
};
use crate::matching::phonetic::cologne_code;
use crate::matching::trigram::{min_shared_trigrams, trigrams};
use crate::models::core::ReferenceEntity;
use crate::utils::db_connect::PgPool;

const ENTITY_COLUMNS: &str =
    "entity_id, original_name, normalized_name, block4, block3, phonetic_code";

pub struct PostgresIndex {
    pool: PgPool,
}

impl PostgresIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn entity_from_row(row: &Row) -> ReferenceEntity {
    ReferenceEntity {
        entity_id: row.get("entity_id"),
        original_name: row.get("original_name"),
        normalized_name: row.get("normalized_name"),
        block4: row.get("block4"),
        block3: row.get("block3"),
        phonetic_code: row.get("phonetic_code"),
    }
}

#[async_trait]
impl ReferenceIndex for PostgresIndex {
    async fn candidates(
        &self,
        normalized: &str,
        max_candidates: usize,
    ) -> Result<Vec<ReferenceEntity>, ResolveError> {
        if normalized.is_empty() || max_candidates == 0 {
            return Ok(Vec::new());
        }
        let conn = self
            .pool
            .get()
            .await
            .context("Candidates: failed to get connection from pool")?;
        let limit = max_candidates as i64;

        // entity_id -> (best rank, entity); lower rank wins on overlap.
        let mut merged: HashMap<i64, (u8, ReferenceEntity)> = HashMap::new();
        let mut merge = |rank: u8, rows: Vec<Row>| {
            for row in &rows {
                let entity = entity_from_row(row);
                let slot = merged
                    .entry(entity.entity_id)
                    .or_insert_with(|| (rank, entity));
                if rank < slot.0 {
                    slot.0 = rank;
                }
            }
        };

        let exact_query = format!(
            "SELECT {} FROM company_reference WHERE normalized_name = $1",
            ENTITY_COLUMNS
        );
        merge(
            RANK_EXACT,
            conn.query(&exact_query, &[&normalized])
                .await
                .context("Candidates: exact-name query failed")?,
        );

        let block4 = block_key(normalized, BLOCK4_WIDTH);
        let block4_query = format!(
            "SELECT {} FROM company_reference WHERE block4 = $1 LIMIT $2",
            ENTITY_COLUMNS
        );
        merge(
            RANK_BLOCK4,
            conn.query(&block4_query, &[&block4, &limit])
                .await
                .context("Candidates: block4 query failed")?,
        );

        let code = cologne_code(normalized);
        if !code.is_empty() {
            let phonetic_query = format!(
                "SELECT {} FROM company_reference WHERE phonetic_code = $1 LIMIT $2",
                ENTITY_COLUMNS
            );
            merge(
                RANK_PHONETIC,
                conn.query(&phonetic_query, &[&code, &limit])
                    .await
                    .context("Candidates: phonetic query failed")?,
            );
        }

        let block3 = block_key(normalized, BLOCK3_WIDTH);
        let block3_query = format!(
            "SELECT {} FROM company_reference WHERE block3 = $1 LIMIT $2",
            ENTITY_COLUMNS
        );
        merge(
            RANK_BLOCK3,
            conn.query(&block3_query, &[&block3, &limit])
                .await
                .context("Candidates: block3 query failed")?,
        );

        let input_grams: Vec<String> = trigrams(normalized).into_iter().collect();
        let needed = min_shared_trigrams(input_grams.len()) as i64;
        let trigram_query = format!(
            "SELECT {cols} \
             FROM company_trigram t \
             JOIN company_reference r ON r.entity_id = t.entity_id \
             WHERE t.trigram = ANY($1) \
             GROUP BY {cols} \
             HAVING COUNT(DISTINCT t.trigram) >= $2 \
             LIMIT $3",
            cols = "r.entity_id, r.original_name, r.normalized_name, r.block4, r.block3, r.phonetic_code"
        );
        merge(
            RANK_TRIGRAM,
            conn.query(&trigram_query, &[&input_grams, &needed, &limit])
                .await
                .context("Candidates: trigram overlap query failed")?,
        );

        let mut ordered: Vec<(u8, i64, ReferenceEntity)> = merged
            .into_values()
            .map(|(rank, entity)| (rank, entity.entity_id, entity))
            .collect();
        ordered.sort_unstable_by_key(|(rank, entity_id, _)| (*rank, *entity_id));
        ordered.truncate(max_candidates);
        Ok(ordered.into_iter().map(|(_, _, entity)| entity).collect())
    }
}

#[async_trait]
impl MetricStore for PostgresIndex {
    async fn latest_metric(&self, entity_id: i64) -> Result<Option<f64>, ResolveError> {
        let conn = self
            .pool
            .get()
            .await
            .context("Metric lookup: failed to get connection from pool")?;
        let row = conn
            .query_opt(
                "SELECT metric_value FROM company_metric \
                 WHERE entity_id = $1 \
                 ORDER BY as_of_date DESC \
                 LIMIT 1",
                &[&entity_id],
            )
            .await
            .context("Metric lookup: latest-value query failed")?;
        Ok(row.map(|r| r.get::<_, f64>("metric_value")))
    }
}
