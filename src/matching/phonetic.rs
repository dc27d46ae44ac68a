// src/matching/phonetic.rs

//! Cologne Phonetic (Kölner Phonetik) encoder.
//!
//! Collapses German/Swiss spelling variants ("Müller"/"Mueller",
//! "Meyer"/"Meier"/"Maier") onto one code, which English-oriented Soundex
//! does not. Output is a variable-length digit string; it is deliberately
//! not padded or truncated to four characters, so long compound names keep
//! their precision.

/// Encodes a name into its Cologne Phonetic code. Deterministic and total
/// over `{A–Z, Ä, Ö, Ü, ß}`; characters outside the alphabet (spaces,
/// digits) emit nothing.
pub fn cologne_code(input: &str) -> String {
    let upper = input.to_uppercase();
    let chars: Vec<char> = upper
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || matches!(c, 'Ä' | 'Ö' | 'Ü'))
        .collect();
    if chars.is_empty() {
        return String::new();
    }

    let mut raw = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();

        let code = match c {
            'A' | 'E' | 'I' | 'O' | 'U' | 'Ä' | 'Ö' | 'Ü' | 'Y' => Some('0'),
            'B' => Some('1'),
            'P' => {
                if next == Some('H') {
                    Some('3')
                } else {
                    Some('1')
                }
            }
            'D' | 'T' => {
                if matches!(next, Some('C') | Some('S') | Some('Z')) {
                    Some('8')
                } else {
                    Some('2')
                }
            }
            'F' | 'V' | 'W' => Some('3'),
            'G' | 'K' | 'Q' => Some('4'),
            'C' => {
                if i == 0 {
                    if matches!(
                        next,
                        Some('A')
                            | Some('H')
                            | Some('K')
                            | Some('L')
                            | Some('O')
                            | Some('Q')
                            | Some('R')
                            | Some('U')
                            | Some('X')
                    ) {
                        Some('4')
                    } else {
                        Some('8')
                    }
                } else if matches!(prev, Some('S') | Some('Z')) {
                    Some('8')
                } else {
                    Some('4')
                }
            }
            'X' => {
                if matches!(prev, Some('C') | Some('K') | Some('Q')) {
                    Some('8')
                } else {
                    Some('4')
                }
            }
            'L' => Some('5'),
            'M' | 'N' => Some('6'),
            'R' => Some('7'),
            'S' | 'Z' => Some('8'),
            // H is silent: emits nothing, and because it emits nothing it is
            // transparent for the duplicate-collapse step below.
            'H' => None,
            _ => None,
        };
        if let Some(digit) = code {
            raw.push(digit);
        }
    }

    // Collapse runs of identical codes, then drop every '0' that is not the
    // leading character: the leading-vowel signal survives, interior vowels
    // do not.
    let mut collapsed = String::with_capacity(raw.len());
    for digit in raw.chars() {
        if collapsed.chars().last() != Some(digit) {
            collapsed.push(digit);
        }
    }
    let mut out = String::with_capacity(collapsed.len());
    for (i, digit) in collapsed.chars().enumerate() {
        if i == 0 || digit != '0' {
            out.push(digit);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umlaut_and_digraph_spellings_share_a_code() {
        assert_eq!(cologne_code("Müller"), cologne_code("Mueller"));
        assert_eq!(cologne_code("Müller"), "657");
    }

    #[test]
    fn meyer_variants_share_a_code() {
        assert_eq!(cologne_code("Meyer"), "67");
        assert_eq!(cologne_code("Meier"), "67");
        assert_eq!(cologne_code("Maier"), "67");
    }

    #[test]
    fn leading_vowel_signal_is_kept() {
        assert_eq!(cologne_code("Acme"), "046");
        assert_eq!(cologne_code("Emmen"), "066");
    }

    #[test]
    fn long_compound_name_keeps_full_length() {
        // Reference value for the classic Kölner Phonetik example.
        assert_eq!(cologne_code("Müller-Lüdenscheidt"), "65752682");
        assert_eq!(cologne_code("muellerluedenscheidt"), "65752682");
    }

    #[test]
    fn silent_h_is_transparent() {
        assert_eq!(cologne_code("Bahnhof"), "163");
        // The two S codes around a silent H still collapse into one.
        assert_eq!(cologne_code("shs"), "8");
    }

    #[test]
    fn context_rules_for_c_and_x() {
        // Leading C before R takes the hard code.
        assert_eq!(cologne_code("Cr"), "47");
        // Leading C before E takes the sibilant code.
        assert_eq!(cologne_code("Ce"), "8");
        // Mid-string C after S stays sibilant and collapses with it.
        assert_eq!(cologne_code("asc"), "08");
        // X after K collapses to the sibilant.
        assert_eq!(cologne_code("kx"), "48");
    }

    #[test]
    fn total_on_degenerate_input() {
        assert_eq!(cologne_code(""), "");
        assert_eq!(cologne_code("12 34"), "");
        assert_eq!(cologne_code("hhh"), "");
    }
}
