//! Score Extraction — best-effort parse of the overall score out of the
//! free-text critique.
//!
//! The eight-section layout is instructed, not guaranteed by any schema, so a
//! miss is a normal outcome here: the caller records `Score::Unavailable` and
//! the evaluation still succeeds.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::record::Score;

/// Anchored on the section-1 label, case-insensitive. The long form of the
/// label ("de 0 a 10 da MINHA performance") is consumed as a literal when
/// present so its own digits are never captured; the score is then the first
/// numeral after the label, however much prose, markdown or newlines sit in
/// between. Accepts integers and one-decimal numerals with either separator.
static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)nota\s+geral(?:\s+de\s+0\s+a\s+10(?:\s+da\s+minha\s+performance)?)?\D*?(\d+(?:[.,]\d)?)",
    )
    .expect("score pattern must compile")
});

/// Locates the first score following the section-1 label. Returns
/// `Score::Unavailable` when no label-plus-numeral match exists or the
/// numeral falls outside [0, 10].
pub fn extract_score(text: &str) -> Score {
    let Some(captures) = SCORE_PATTERN.captures(text) else {
        return Score::Unavailable;
    };

    let raw = captures[1].replace(',', ".");
    match raw.parse::<f64>() {
        Ok(value) if (0.0..=10.0).contains(&value) => Score::Value(value),
        _ => Score::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_label_with_decimal() {
        let text = "**1. Nota geral de 0 a 10 da MINHA performance.**\n\nNota: 7.5\n\n**2. ...**";
        assert_eq!(extract_score(text), Score::Value(7.5));
    }

    #[test]
    fn test_label_digits_are_not_mistaken_for_the_score() {
        // "0 a 10" belongs to the label; the score is the 3 after it.
        let text = "Nota geral de 0 a 10 da MINHA performance: 3";
        assert_eq!(extract_score(text), Score::Value(3.0));
    }

    #[test]
    fn test_short_label_form() {
        assert_eq!(extract_score("Nota geral: 8"), Score::Value(8.0));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extract_score("NOTA GERAL DE 0 A 10: 6.5"), Score::Value(6.5));
        assert_eq!(extract_score("nota geral: 9"), Score::Value(9.0));
    }

    #[test]
    fn test_newlines_between_label_and_numeral() {
        let text = "1. **Nota geral de 0 a 10 da MINHA performance.**\n\n   **8.5**";
        assert_eq!(extract_score(text), Score::Value(8.5));
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(extract_score("Nota geral: 7,5"), Score::Value(7.5));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Nota geral: 6\n... mais texto ...\nNota geral: 9";
        assert_eq!(extract_score(text), Score::Value(6.0));
    }

    #[test]
    fn test_missing_label_is_unavailable() {
        assert_eq!(
            extract_score("A entrevista foi boa, mas sem avaliação numérica."),
            Score::Unavailable
        );
    }

    #[test]
    fn test_label_without_numeral_is_unavailable() {
        assert_eq!(
            extract_score("Nota geral: não foi possível avaliar."),
            Score::Unavailable
        );
    }

    #[test]
    fn test_out_of_range_is_unavailable() {
        assert_eq!(extract_score("Nota geral: 15"), Score::Unavailable);
    }

    #[test]
    fn test_empty_text_is_unavailable() {
        assert_eq!(extract_score(""), Score::Unavailable);
    }

    #[test]
    fn test_boundary_scores() {
        assert_eq!(extract_score("Nota geral: 0"), Score::Value(0.0));
        assert_eq!(extract_score("Nota geral: 10"), Score::Value(10.0));
    }
}
