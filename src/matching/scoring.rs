// src/matching/scoring.rs
use log::debug;
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::config::ResolverConfig;
use crate::models::core::{MatchResult, MatchType, ReferenceEntity};

/// Plain edit-distance similarity on the 0-100 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Best alignment of the shorter string inside the longer one, 0-100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = shorter.chars().count();
    let long_chars: Vec<char> = longer.chars().collect();
    if short_len == 0 {
        return if long_chars.is_empty() { 100.0 } else { 0.0 };
    }
    if short_len == long_chars.len() {
        return ratio(shorter, longer);
    }

    let mut best: f64 = 0.0;
    for window in long_chars.windows(short_len) {
        let slice: String = window.iter().collect();
        best = best.max(ratio(shorter, &slice));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Similarity after sorting whitespace tokens, neutralizing word order.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Holistic similarity in the spirit of fuzzywuzzy's WRatio: the plain ratio,
/// improved by a discounted token-sort pass and, for length-mismatched pairs,
/// a discounted partial alignment.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let base = ratio(a, b);
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return base;
    }

    let mut best = base.max(0.95 * token_sort_ratio(a, b));
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    if len_ratio > 1.5 {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        best = best.max(partial_scale * partial_ratio(a, b));
    }
    best
}

/// Fixed-weight combination of the three similarity metrics, 0-100.
pub fn composite_score(input: &str, candidate: &str, config: &ResolverConfig) -> f64 {
    config.weight_holistic * weighted_ratio(input, candidate)
        + config.weight_token_sort * token_sort_ratio(input, candidate)
        + config.weight_partial * partial_ratio(input, candidate)
}

/// Scores every candidate against the normalized input and selects the best
/// one above the threshold.
///
/// An exact `normalized_name` hit short-circuits to score 100 without any
/// fuzzy scoring. Ties on the composite score are broken by the higher
/// Jaro-Winkler similarity, then by first encountered (candidates arrive in
/// retrieval-priority order, so that means the lower retrieval rank).
/// Fuzzy scores are capped at 99 so that 100 stays reserved for exact hits.
pub fn score_and_select(
    input: &str,
    candidates: &[ReferenceEntity],
    config: &ResolverConfig,
) -> MatchResult {
    if let Some(exact) = candidates.iter().find(|c| c.normalized_name == input) {
        return MatchResult::exact(exact);
    }

    let mut best: Option<(&ReferenceEntity, f64, f64)> = None;
    for candidate in candidates {
        let composite = composite_score(input, &candidate.normalized_name, config);
        let jw = jaro_winkler(input, &candidate.normalized_name);
        let improves = match best {
            None => true,
            Some((_, best_composite, best_jw)) => {
                composite > best_composite || (composite == best_composite && jw > best_jw)
            }
        };
        if improves {
            best = Some((candidate, composite, jw));
        }
    }

    match best {
        Some((candidate, composite, _)) if composite >= config.score_threshold => {
            debug!(
                "Fuzzy match '{}' -> entity {} ('{}') at {:.1}",
                input, candidate.entity_id, candidate.normalized_name, composite
            );
            MatchResult {
                entity_id: Some(candidate.entity_id),
                matched_name: Some(candidate.original_name.clone()),
                score: (composite.round() as i32).min(99),
                match_type: MatchType::Fuzzy,
            }
        }
        _ => MatchResult::none(),
    }
}
