// src/cache/memory_store.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::cache::{CacheStore, CachedMatch};

/// Process-local stand-in for the persistent cache tier. Useful for tests
/// and single-process deployments that do not need durability across
/// restarts; entries still honor their TTL.
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, (CachedMatch, DateTime<Utc>)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, normalized: &str) -> Result<Option<CachedMatch>> {
        let mut entries = self.entries.lock().await;
        match entries.get(normalized) {
            Some((entry, expires_at)) if Utc::now() < *expires_at => Ok(Some(entry.clone())),
            Some(_) => {
                entries.remove(normalized);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, normalized: &str, entry: &CachedMatch, ttl: Duration) -> Result<()> {
        let expires_at = entry.cached_at + ttl;
        self.entries
            .lock()
            .await
            .insert(normalized.to_string(), (entry.clone(), expires_at));
        Ok(())
    }
}
