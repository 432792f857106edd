//! Text normalization and chunk quality filtering.
//!
//! PDF extraction and OCR leave behind broken line wraps, stray control
//! characters, and scattered single letters. [`clean_text`] removes these
//! aggressively; [`passes_quality`] rejects fragments that still look like
//! corrupted output after cleaning.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::QualityConfig;

static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
/// Allow-list: word characters, whitespace, common punctuation, currency.
/// `\w` is Unicode-aware, so letters of any script survive; symbols,
/// bullets, and emoji do not.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?;:()\-"'%$€]"#).unwrap());
/// A single ASCII letter surrounded by whitespace is almost always OCR noise.
static ISOLATED_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s[a-zA-Z]\s").unwrap());

/// Clean raw extracted text.
///
/// Collapses newline and whitespace runs into single spaces, strips
/// characters outside the allow-list, removes isolated single letters, and
/// trims. Empty input returns an empty string.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = NEWLINES.replace_all(text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = DISALLOWED.replace_all(&text, "");
    // Single non-overlapping pass; the quality ratio below catches anything
    // dense enough to survive it.
    let text = ISOLATED_CHAR.replace_all(&text, " ");

    text.trim().to_string()
}

/// Fraction of whitespace-delimited words that are a single character.
///
/// Returns `None` when the text has no words; callers must treat that as a
/// failing ratio rather than dividing by zero.
pub fn single_char_ratio(text: &str) -> Option<f32> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let singles = words.iter().filter(|w| w.chars().count() == 1).count();
    #[allow(clippy::cast_precision_loss)]
    Some(singles as f32 / words.len() as f32)
}

/// The quality gate applied before any [`Chunk`](crate::document::Chunk) is
/// materialized, shared by every chunking strategy.
///
/// Rejects cleaned text that is shorter than `min_chunk_chars` or whose
/// single-character-word ratio exceeds `max_single_char_ratio` (a high ratio
/// signals corrupted OCR output). Text with zero words always fails.
pub fn passes_quality(text: &str, policy: &QualityConfig) -> bool {
    if text.chars().count() < policy.min_chunk_chars {
        return false;
    }
    match single_char_ratio(text) {
        Some(ratio) => ratio <= policy.max_single_char_ratio,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn collapses_newlines_and_whitespace() {
        assert_eq!(clean_text("first\n\n\nsecond   third\t fourth"), "first second third fourth");
    }

    #[test]
    fn strips_characters_outside_allow_list() {
        assert_eq!(clean_text("price: 100$ or 90€ \u{fffd}\u{2022}done!"), "price: 100$ or 90€ done!");
    }

    #[test]
    fn keeps_common_punctuation() {
        let text = "Wait, really? Yes; (see 4.2) - \"quoted\" 'too': 50%!";
        assert_eq!(clean_text(text), text);
    }

    #[test]
    fn removes_isolated_single_letters() {
        assert_eq!(clean_text("the q quick brown fox"), "the quick brown fox");
    }

    #[test]
    fn digits_are_not_treated_as_ocr_noise() {
        assert_eq!(clean_text("chapter 4 begins"), "chapter 4 begins");
    }

    #[test]
    fn ratio_is_none_for_empty_text() {
        assert_eq!(single_char_ratio(""), None);
        assert_eq!(single_char_ratio("   "), None);
    }

    #[test]
    fn ratio_counts_single_character_words() {
        let ratio = single_char_ratio("a fine b day c").unwrap();
        assert!((ratio - 0.6).abs() < 1e-6);
    }

    #[test]
    fn gate_rejects_short_text() {
        let policy = QualityConfig::default();
        assert!(!passes_quality("too short to keep", &policy));
    }

    #[test]
    fn gate_rejects_all_single_letters() {
        let policy = QualityConfig::default();
        // Long enough to pass the length check, but every word is one letter.
        let adversarial = "a ".repeat(120);
        assert!(!passes_quality(adversarial.trim(), &policy));
    }

    #[test]
    fn gate_rejects_zero_words_without_panicking() {
        let policy = QualityConfig { min_chunk_chars: 0, ..QualityConfig::default() };
        assert!(!passes_quality("", &policy));
    }

    #[test]
    fn gate_accepts_ordinary_prose() {
        let policy = QualityConfig::default();
        let text = "The quarterly report covers revenue growth across all regions, \
                    with particular attention to the renewable energy segment.";
        assert!(passes_quality(text, &policy));
    }
}
