// src/matching/trigram.rs
use std::collections::HashSet;

/// Produces the set of padded 3-character substrings of a normalized name.
/// The input is padded with one boundary space on each side, so word starts
/// and ends become retrieval keys too. Repeated grams ("banana") collapse
/// into one entry, so the set can be smaller than the padded length minus
/// two; a repeated gram counts once toward any overlap minimum. Used only
/// for candidate retrieval, never for scoring.
pub fn trigrams(normalized: &str) -> HashSet<String> {
    let padded: Vec<char> = std::iter::once(' ')
        .chain(normalized.chars())
        .chain(std::iter::once(' '))
        .collect();

    let mut grams = HashSet::new();
    if padded.len() < 3 {
        return grams;
    }
    for window in padded.windows(3) {
        grams.insert(window.iter().collect());
    }
    grams
}

/// Minimum shared-trigram count a candidate must reach, scaled down for
/// short inputs so two-letter names are still retrievable.
pub fn min_shared_trigrams(input_trigram_count: usize) -> usize {
    if input_trigram_count >= 5 {
        3
    } else if input_trigram_count >= 3 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_character_input_yields_boundary_grams() {
        let grams = trigrams("ab");
        let expected: HashSet<String> = [" ab", "ab "].iter().map(|s| s.to_string()).collect();
        assert_eq!(grams, expected);
    }

    #[test]
    fn gram_count_matches_padded_length() {
        for s in ["a", "ab", "credit suisse", "zürich"] {
            let padded_len = s.chars().count() + 2;
            // Distinct-set size can only fall below this if a gram repeats.
            assert!(trigrams(s).len() <= padded_len - 2);
            assert!(!trigrams(s).is_empty());
        }
        // No repeated grams here, so the count is exact.
        assert_eq!(trigrams("abcd").len(), 4);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(trigrams("").is_empty());
    }

    #[test]
    fn spacing_differences_still_overlap() {
        let spaced = trigrams("credit suisse");
        let joined = trigrams("creditsuisse");
        let shared = spaced.intersection(&joined).count();
        assert!(shared >= 5, "only {} shared trigrams", shared);
    }

    #[test]
    fn dynamic_minimum_scales_with_input_size() {
        assert_eq!(min_shared_trigrams(8), 3);
        assert_eq!(min_shared_trigrams(5), 3);
        assert_eq!(min_shared_trigrams(4), 2);
        assert_eq!(min_shared_trigrams(3), 2);
        assert_eq!(min_shared_trigrams(2), 1);
        assert_eq!(min_shared_trigrams(0), 1);
    }
}
