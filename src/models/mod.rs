// src/models/mod.rs
pub mod core;

pub use self::core::{MatchResult, MatchType, MetricRecord, ReferenceEntity, ResolvedCompany};
