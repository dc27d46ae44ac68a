// src/cache/postgres_store.rs

//! Durable cache tier backed by Postgres.
//!
//! Expected schema:
//!
//!   match_cache(normalized_name text primary key, found boolean,
//!               result jsonb, cached_at timestamptz, expires_at timestamptz)
//!
//! `found` mirrors the positive/negative discriminator for ad-hoc queries;
//! the full `MatchResult` (or null, for negative entries) lives in `result`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::cache::{CacheStore, CachedMatch};
use crate::models::core::MatchResult;
use crate::utils::db_connect::PgPool;

pub struct PostgresCacheStore {
    pool: PgPool,
}

impl PostgresCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for PostgresCacheStore {
    async fn get(&self, normalized: &str) -> Result<Option<CachedMatch>> {
        let conn = self
            .pool
            .get()
            .await
            .context("Cache read: failed to get connection from pool")?;
        let row = conn
            .query_opt(
                "SELECT result, cached_at FROM match_cache \
                 WHERE normalized_name = $1 AND expires_at > now()",
                &[&normalized],
            )
            .await
            .context("Cache read: select failed")?;

        match row {
            Some(row) => {
                let value: serde_json::Value = row.get("result");
                let result: Option<MatchResult> = serde_json::from_value(value)
                    .context("Cache read: stored result failed to deserialize")?;
                let cached_at: DateTime<Utc> = row.get("cached_at");
                Ok(Some(CachedMatch { result, cached_at }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, normalized: &str, entry: &CachedMatch, ttl: Duration) -> Result<()> {
        let conn = self
            .pool
            .get()
            .await
            .context("Cache write: failed to get connection from pool")?;
        let result_json =
            serde_json::to_value(&entry.result).context("Cache write: result failed to serialize")?;
        let expires_at = entry.cached_at + ttl;
        conn.execute(
            "INSERT INTO match_cache (normalized_name, found, result, cached_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (normalized_name) DO UPDATE SET \
                 found = EXCLUDED.found, \
                 result = EXCLUDED.result, \
                 cached_at = EXCLUDED.cached_at, \
                 expires_at = EXCLUDED.expires_at",
            &[
                &normalized,
                &!entry.is_negative(),
                &result_json,
                &entry.cached_at,
                &expires_at,
            ],
        )
        .await
        .context("Cache write: upsert failed")?;
        Ok(())
    }
}
