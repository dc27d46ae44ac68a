// src/error.rs
use thiserror::Error;

/// Failures surfaced by a single lookup.
///
/// There is no fatal category here: a lookup either completes with a clean
/// `MatchResult` (possibly `NONE`) or fails with a retryable store error.
/// Cache-tier failures never reach this type; they degrade to a cache miss.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Candidate retrieval or metric lookup could not reach the backing
    /// store. Not retried internally; the caller may retry the whole lookup.
    #[error(transparent)]
    StoreUnavailable(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::StoreUnavailable(_) => true,
        }
    }
}
