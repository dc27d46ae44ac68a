// src/models/core.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the reference registry, with every derived field recomputed
/// from `normalized_name` when the snapshot is rebuilt. The registry is
/// rebuilt wholesale; derived fields are never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub entity_id: i64,
    pub original_name: String,
    pub normalized_name: String,
    pub block4: String,
    pub block3: String,
    pub phonetic_code: String,
}

/// One time-stamped metric row. Append-only, populated by an external batch
/// job; only the latest row per entity is read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity_id: i64,
    pub metric_value: f64,
    pub as_of_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Block,
    Phonetic,
    Trigram,
    Fuzzy,
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "EXACT",
            MatchType::Block => "BLOCK",
            MatchType::Phonetic => "PHONETIC",
            MatchType::Trigram => "TRIGRAM",
            MatchType::Fuzzy => "FUZZY",
            MatchType::None => "NONE",
        }
    }
}

/// Outcome of one lookup.
///
/// Invariants: `score == 100` iff `match_type == Exact`; `match_type == None`
/// iff `entity_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entity_id: Option<i64>,
    pub matched_name: Option<String>,
    pub score: i32,
    pub match_type: MatchType,
}

impl MatchResult {
    pub fn none() -> Self {
        MatchResult {
            entity_id: None,
            matched_name: None,
            score: 0,
            match_type: MatchType::None,
        }
    }

    pub fn exact(entity: &ReferenceEntity) -> Self {
        MatchResult {
            entity_id: Some(entity.entity_id),
            matched_name: Some(entity.original_name.clone()),
            score: 100,
            match_type: MatchType::Exact,
        }
    }

    pub fn is_match(&self) -> bool {
        self.entity_id.is_some()
    }
}

/// A `MatchResult` plus the latest metric value for the matched entity,
/// as handed to the downstream report renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCompany {
    pub result: MatchResult,
    pub metric: Option<f64>,
}
