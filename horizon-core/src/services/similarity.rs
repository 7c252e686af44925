//! String similarity for fuzzy merchant matching
//!
//! Jaro and Jaro-Winkler over Unicode scalar values. Comparisons are
//! case-insensitive and every function is pure.

use crate::config::SimilaritySettings;

/// Jaro-Winkler similarity with configurable prefix bonus
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSimilarity {
    settings: SimilaritySettings,
}

impl StringSimilarity {
    pub fn new(settings: SimilaritySettings) -> Self {
        Self { settings }
    }

    /// Similarity in `[0, 1]`: 1.0 for identical strings, 0.0 if either is blank
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        jaro_winkler_with(a, b, self.settings.scale_factor, self.settings.prefix_cap)
    }
}

/// Jaro similarity
///
/// Characters match when equal and no further apart than
/// `max(|a|, |b|) / 2 - 1`; half the out-of-order matches count as
/// transpositions.
pub fn jaro(a: &str, b: &str) -> f64 {
    let Some((left, right)) = prepare(a, b) else {
        return 0.0;
    };
    if left == right {
        return 1.0;
    }
    jaro_chars(&left, &right)
}

/// Jaro-Winkler similarity with the standard 0.1 scale and 4-char prefix cap
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let defaults = SimilaritySettings::default();
    jaro_winkler_with(a, b, defaults.scale_factor, defaults.prefix_cap)
}

pub fn jaro_winkler_with(a: &str, b: &str, scale_factor: f64, prefix_cap: usize) -> f64 {
    let Some((left, right)) = prepare(a, b) else {
        return 0.0;
    };
    if left == right {
        return 1.0;
    }

    let jaro = jaro_chars(&left, &right);
    let prefix_len = left
        .iter()
        .zip(right.iter())
        .take(prefix_cap)
        .take_while(|(l, r)| l == r)
        .count();

    (jaro + prefix_len as f64 * scale_factor * (1.0 - jaro)).min(1.0)
}

/// Lowercased character vectors, or `None` when either side is blank
fn prepare(a: &str, b: &str) -> Option<(Vec<char>, Vec<char>)> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return None;
    }
    Some((a.to_lowercase().chars().collect(), b.to_lowercase().chars().collect()))
}

fn jaro_chars(left: &[char], right: &[char]) -> f64 {
    let match_window = (left.len().max(right.len()) / 2).saturating_sub(1);

    let mut left_matched = vec![false; left.len()];
    let mut right_matched = vec![false; right.len()];
    let mut matches = 0usize;

    for (i, l) in left.iter().enumerate() {
        let start = i.saturating_sub(match_window);
        let end = (i + match_window + 1).min(right.len());
        for j in start..end {
            if right_matched[j] || right[j] != *l {
                continue;
            }
            left_matched[i] = true;
            right_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let left_in_order = left
        .iter()
        .zip(&left_matched)
        .filter_map(|(c, matched)| matched.then_some(c));
    let right_in_order = right
        .iter()
        .zip(&right_matched)
        .filter_map(|(c, matched)| matched.then_some(c));
    let out_of_order = left_in_order
        .zip(right_in_order)
        .filter(|(l, r)| l != r)
        .count();
    let transpositions = out_of_order as f64 / 2.0;

    let m = matches as f64;
    (m / left.len() as f64 + m / right.len() as f64 + (m - transpositions) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identical_strings_score_one() {
        for s in ["a", "starbucks", "Whole Foods Market", "café"] {
            assert_eq!(jaro_winkler(s, s), 1.0);
            assert_eq!(jaro(s, s), 1.0);
        }
        assert_eq!(jaro_winkler("STARBUCKS", "starbucks"), 1.0);
    }

    #[test]
    fn test_empty_or_blank_scores_zero() {
        assert_eq!(jaro_winkler("", "starbucks"), 0.0);
        assert_eq!(jaro_winkler("starbucks", ""), 0.0);
        assert_eq!(jaro_winkler("   ", "starbucks"), 0.0);
        assert_eq!(jaro_winkler("", ""), 0.0);
        assert_eq!(jaro("", "x"), 0.0);
    }

    #[test]
    fn test_classic_reference_values() {
        approx(jaro("MARTHA", "MARHTA"), 0.944);
        approx(jaro_winkler("MARTHA", "MARHTA"), 0.961);
        approx(jaro("DWAYNE", "DUANE"), 0.822);
        approx(jaro_winkler("DWAYNE", "DUANE"), 0.84);
        approx(jaro("DIXON", "DICKSONX"), 0.767);
        approx(jaro_winkler("DIXON", "DICKSONX"), 0.813);
    }

    #[test]
    fn test_no_common_characters() {
        assert_eq!(jaro_winkler("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_prefix_bonus_is_non_negative() {
        let pairs = [
            ("starbucks", "starbuck"),
            ("amazon mktp", "amazon prime"),
            ("shell oil", "shell gas"),
            ("target", "tarjay"),
        ];
        for (a, b) in pairs {
            assert!(jaro_winkler(a, b) >= jaro(a, b));
        }
    }

    #[test]
    fn test_scale_and_prefix_cap_are_configurable() {
        let plain = StringSimilarity::new(SimilaritySettings {
            scale_factor: 0.0,
            prefix_cap: 4,
        });
        approx(plain.similarity("MARTHA", "MARHTA"), jaro("MARTHA", "MARHTA"));

        let short_prefix = StringSimilarity::new(SimilaritySettings {
            scale_factor: 0.1,
            prefix_cap: 1,
        });
        assert!(short_prefix.similarity("MARTHA", "MARHTA") < jaro_winkler("MARTHA", "MARHTA"));
    }

    #[test]
    fn test_symmetry() {
        approx(jaro_winkler("walmart", "wal-mart"), jaro_winkler("wal-mart", "walmart"));
    }
}
