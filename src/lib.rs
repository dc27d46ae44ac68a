// src/lib.rs

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod matching;
pub mod models;
pub mod resolver;
pub mod utils;

pub use cache::{CacheStore, CachedMatch, MatchCache};
pub use config::ResolverConfig;
pub use error::ResolveError;
pub use index::{MetricStore, ReferenceIndex};
pub use models::core::{MatchResult, MatchType, MetricRecord, ReferenceEntity, ResolvedCompany};
pub use resolver::Resolver;
