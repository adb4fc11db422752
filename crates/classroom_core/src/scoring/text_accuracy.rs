//! crates/classroom_core/src/scoring/text_accuracy.rs
//!
//! Word-level comparison of a spoken or typed transcript against a reference text.
//! Matching tolerates small misspellings (edit distance) while the order check is an
//! exact lookup against the unmodified spoken words.

use crate::domain::{ScoringResult, TextToken};
use crate::policy::{round2, DEFAULT_TOLERANCE, EXTRA_WORD_PENALTY_POINTS, ORDER_PENALTY_FACTOR};

const STRIPPED_CHARS: [char; 4] = ['.', ',', '?', '!'];

/// Lower-cases, strips `. , ? !` and splits on whitespace, dropping empty tokens.
pub fn tokenize(text: &str) -> Vec<TextToken> {
    text.to_lowercase()
        .replace(STRIPPED_CHARS, "")
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| TextToken {
            text: word.to_string(),
            position,
        })
        .collect()
}

/// Standard edit distance with unit costs for insertion, deletion and substitution.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows of the DP matrix.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Scores `spoken` against `original` with the default tolerance.
pub fn score_text_default(original: &str, spoken: &str) -> ScoringResult {
    score_text(original, spoken, DEFAULT_TOLERANCE)
}

/// Scores `spoken` against `original`.
///
/// An empty reference text yields a zero score (both percentages) rather than a
/// division by zero; any spoken words are still reported as extra.
pub fn score_text(original: &str, spoken: &str, tolerance: usize) -> ScoringResult {
    let original_tokens = tokenize(original);
    let spoken_tokens = tokenize(spoken);

    let mut remaining: Vec<&TextToken> = spoken_tokens.iter().collect();
    let mut correct: Vec<String> = Vec::new();
    let mut missed_words: Vec<String> = Vec::new();

    for token in &original_tokens {
        let hit = remaining
            .iter()
            .position(|candidate| levenshtein_distance(&token.text, &candidate.text) <= tolerance);
        match hit {
            Some(index) => {
                remaining.remove(index);
                correct.push(token.text.clone());
            }
            None => missed_words.push(token.text.clone()),
        }
    }

    let extra_words: Vec<String> = remaining.iter().map(|t| t.text.clone()).collect();
    let total_words = original_tokens.len();
    let correct_words = correct.len();

    if total_words == 0 {
        return ScoringResult {
            percentage: 0.0,
            order_percentage: 0.0,
            missed_words,
            extra_words,
            total_words,
            correct_words,
        };
    }

    let content_accuracy = correct_words as f64 / total_words as f64 * 100.0;

    let order_percentage = if order_maintained(&original_tokens, &spoken_tokens) {
        100.0
    } else {
        (content_accuracy * ORDER_PENALTY_FACTOR).max(0.0)
    };

    let extra_word_penalty =
        extra_words.len() as f64 / total_words as f64 * EXTRA_WORD_PENALTY_POINTS;
    let percentage = (content_accuracy - extra_word_penalty).clamp(0.0, 100.0);

    ScoringResult {
        percentage: round2(percentage),
        order_percentage: round2(order_percentage.min(100.0)),
        missed_words,
        extra_words,
        total_words,
        correct_words,
    }
}

/// Exact-match order check: every original word is looked up by equality in the
/// spoken list, searching from the previous word's index onwards (`-1` when absent),
/// and the resulting indices must never decrease.
fn order_maintained(original: &[TextToken], spoken: &[TextToken]) -> bool {
    let mut last_index: i64 = -1;
    for token in original {
        let from = last_index.max(0) as usize;
        let index = spoken[from.min(spoken.len())..]
            .iter()
            .position(|candidate| candidate.text == token.text)
            .map_or(-1, |i| (from + i) as i64);
        if index < last_index {
            return false;
        }
        last_index = index;
    }
    true
}
