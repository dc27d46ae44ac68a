// src/matching/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;

/// Legal-entity and generic descriptor suffixes stripped from the end of a
/// company name. The bool marks generic descriptors, which are only stripped
/// while more than one word would remain (so "Credit Suisse" keeps its
/// country word but "Holcim Group Schweiz AG" loses its trailers down to
/// "holcim group").
/// Multi-word entries must come before their single-word components here;
/// matching is longest-first regardless of declaration order.
const LEGAL_SUFFIXES: [(&str, bool); 33] = [
    // German legal forms
    ("gmbh & co kgaa", false),
    ("gmbh & co kg", false),
    ("ag & co kg", false),
    ("& co kgaa", false),
    ("& co kg", false),
    ("& co", false),
    ("gmbh", false),
    ("kgaa", false),
    ("ohg", false),
    ("ag", false),
    ("kg", false),
    ("eg", false),
    ("se", false),
    // French legal forms
    ("& cie", false),
    ("sarl", false),
    ("sca", false),
    ("sci", false),
    ("sa", false),
    // Italian-speaking Switzerland
    ("sagl", false),
    // International
    ("inc", false),
    ("ltd", false),
    ("llc", false),
    ("corp", false),
    ("plc", false),
    ("bv", false),
    ("nv", false),
    // Generic descriptors
    ("holdings", true),
    ("holding", true),
    ("gruppe", true),
    ("group", true),
    ("switzerland", true),
    ("svizzera", true),
    ("schweiz", true),
];

// "suisse" belongs to the generic set too, but as its own entry so the list
// above stays grouped by language.
const GENERIC_SUISSE: (&str, bool) = ("suisse", true);

static SUFFIXES_BY_LENGTH: Lazy<Vec<(&'static str, bool)>> = Lazy::new(|| {
    let mut suffixes: Vec<(&'static str, bool)> = LEGAL_SUFFIXES.to_vec();
    suffixes.push(GENERIC_SUISSE);
    suffixes.sort_by_key(|(s, _)| std::cmp::Reverse(s.len()));
    suffixes
});

static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.,;:!?()\[\]{}"'\-–—]"#).expect("punctuation regex is valid"));

/// Canonicalizes a raw company-name string. Deterministic, total (worst case
/// returns an empty string) and idempotent.
///
/// Steps, in order: lowercase, map European diacritics to ASCII digraphs,
/// replace punctuation with whitespace, collapse whitespace and trim, strip
/// trailing legal/generic suffixes (longest first, space-bounded).
/// Punctuation goes first so wrapped suffixes ("Inc.", "(AG)") are already
/// bare words when stripping runs; the reverse order leaves them behind on
/// the first pass and breaks idempotence.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let folded = fold_diacritics(&lowered);
    let no_punct = PUNCTUATION_RE.replace_all(&folded, " ");
    let collapsed = no_punct.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_legal_suffixes(&collapsed)
}

fn fold_diacritics(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            'é' | 'è' | 'ê' => out.push('e'),
            'à' | 'â' => out.push('a'),
            'ç' => out.push('c'),
            _ => out.push(c),
        }
    }
    out
}

/// Strips trailing suffix units. A suffix only matches as a whole trailing
/// word preceded by a space; mid-string occurrences and whole-string matches
/// are left alone.
fn strip_legal_suffixes(name: &str) -> String {
    let mut current = name.trim_end().to_string();
    loop {
        let mut stripped = false;
        for (suffix, is_generic) in SUFFIXES_BY_LENGTH.iter() {
            if current.len() <= suffix.len() || !current.ends_with(suffix) {
                continue;
            }
            let boundary = current.len() - suffix.len();
            if !current[..boundary].ends_with(' ') {
                continue;
            }
            let remainder = current[..boundary].trim_end();
            if remainder.is_empty() {
                continue;
            }
            if *is_generic && remainder.split_whitespace().count() < 2 {
                continue;
            }
            current = remainder.to_string();
            stripped = true;
            break;
        }
        if !stripped {
            return current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_folds_diacritics() {
        assert_eq!(normalize("Müller"), "mueller");
        assert_eq!(normalize("Nestlé"), "nestle");
        assert_eq!(normalize("Crédit Agricole Bâle"), "credit agricole bale");
        assert_eq!(normalize("STRASSE Öl ß"), "strasse oel ss");
    }

    #[test]
    fn strips_trailing_legal_suffix() {
        assert_eq!(normalize("Creditreform AG"), "creditreform");
        assert_eq!(normalize("Example GmbH"), "example");
        assert_eq!(normalize("Acme Inc"), "acme");
        assert_eq!(normalize("Banque Privée SA"), "banque privee");
    }

    #[test]
    fn strips_longest_suffix_first() {
        // "& co kg" must win over "kg" so the ampersand unit goes in one cut.
        assert_eq!(normalize("Müller GmbH & Co KG"), "mueller");
        assert_eq!(normalize("Meier & Co"), "meier");
    }

    #[test]
    fn strips_stacked_suffixes() {
        // "ag" and "schweiz" go; "group" stays because only one word would
        // remain after it.
        assert_eq!(normalize("Holcim Group Schweiz AG"), "holcim group");
        assert_eq!(normalize("Swatch Group AG"), "swatch group");
        assert_eq!(normalize("Vontobel Holding AG Schweiz"), "vontobel holding");
    }

    #[test]
    fn keeps_mid_string_suffix_words() {
        // "ag" inside a word is not a trailing unit.
        assert_eq!(normalize("Aggregate"), "aggregate");
        // "group" leading is not trailing.
        assert_eq!(normalize("Group Therapy"), "group therapy");
    }

    #[test]
    fn keeps_generic_suffix_of_two_word_brands() {
        // Stripping "suisse" here would erase the brand itself.
        assert_eq!(normalize("Credit Suisse AG"), "credit suisse");
        assert_eq!(normalize("credit suisse"), "credit suisse");
    }

    #[test]
    fn whole_string_suffix_is_not_stripped() {
        assert_eq!(normalize("AG"), "ag");
        assert_eq!(normalize("Holding"), "holding");
    }

    #[test]
    fn removes_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize("  A  .  B  "), "a b");
        assert_eq!(normalize("\"Quoted\" {Name}"), "quoted name");
    }

    #[test]
    fn punctuation_wrapped_suffixes_are_stripped_in_one_pass() {
        assert_eq!(normalize("Acme Inc."), "acme");
        assert_eq!(normalize("Foo (AG)"), "foo");
        assert_eq!(normalize("Coca-Cola (Schweiz)"), "coca cola");
    }

    #[test]
    fn total_on_degenerate_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "Creditreform AG",
            "Credit Suisse AG",
            "Müller GmbH & Co KG",
            "Holcim Group Schweiz AG",
            "Nestlé S.A.",
            "Acme Inc.",
            "Foo (AG)",
            "   ",
            "AG",
            "zürcher kantonalbank",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }
}
