//! crates/classroom_core/src/scoring/grader.rs
//!
//! Composite grading of free-text answers: keyword coverage, semantic similarity from
//! the embedding collaborator, and word-level text accuracy, blended with fixed weights.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::CompositeScore;
use crate::error::{CoreError, CoreResult};
use crate::policy::{
    round2, DEFAULT_TOLERANCE, KEYWORD_WEIGHT, SEMANTIC_WEIGHT, TEXT_ACCURACY_WEIGHT,
};
use crate::ports::{PortError, SentenceSimilarityService};
use crate::scoring::text_accuracy::score_text;

/// Percentage of `key_words` found (case-insensitively) inside `my_answer`.
///
/// An empty keyword list scores 0 instead of dividing by zero.
pub fn keyword_score(my_answer: &str, key_words: &[String]) -> f64 {
    if key_words.is_empty() {
        return 0.0;
    }
    let haystack = my_answer.to_lowercase();
    let hits = key_words
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .count();
    hits as f64 / key_words.len() as f64 * 100.0
}

/// Blends the three signals with the fixed grading weights.
pub fn combine(keyword_score: f64, semantic_score: f64, text_accuracy_score: f64) -> CompositeScore {
    let total = keyword_score * KEYWORD_WEIGHT
        + semantic_score * SEMANTIC_WEIGHT
        + text_accuracy_score * TEXT_ACCURACY_WEIGHT;
    CompositeScore {
        total_score: round2(total.clamp(0.0, 100.0)),
        keyword_score: round2(keyword_score),
        semantic_score: round2(semantic_score),
        text_accuracy_score: round2(text_accuracy_score),
    }
}

/// Grades open-ended answers against a reference answer.
#[derive(Clone)]
pub struct AnswerGrader {
    similarity: Arc<dyn SentenceSimilarityService>,
}

impl AnswerGrader {
    pub fn new(similarity: Arc<dyn SentenceSimilarityService>) -> Self {
        Self { similarity }
    }

    /// Scores `my_answer` against the reference `answer`.
    ///
    /// Fails with `CoreError::Dependency` when the similarity service is unavailable
    /// or returns no score; the caller decides whether to retry.
    pub async fn grade_answer(
        &self,
        answer: &str,
        my_answer: &str,
        key_words: &[String],
    ) -> CoreResult<CompositeScore> {
        let keyword = keyword_score(my_answer, key_words);

        let scores = self
            .similarity
            .similarity(answer, &[my_answer.to_string()])
            .await
            .map_err(|e| {
                warn!("Similarity service failed: {}", e);
                CoreError::Dependency(e)
            })?;
        let similarity = scores.first().copied().ok_or_else(|| {
            CoreError::Dependency(PortError::Unexpected(
                "similarity service returned no scores".to_string(),
            ))
        })?;
        let semantic = f64::from(similarity).clamp(0.0, 1.0) * 100.0;

        let text_accuracy = score_text(answer, my_answer, DEFAULT_TOLERANCE).percentage;

        let score = combine(keyword, semantic, text_accuracy);
        debug!(
            total = score.total_score,
            keyword = score.keyword_score,
            semantic = score.semantic_score,
            text = score.text_accuracy_score,
            "Graded answer"
        );
        Ok(score)
    }
}
