//! crates/classroom_core/src/policy.rs
//!
//! Grading and recommendation constants, kept in one place so the policy can be
//! audited without reading the algorithms.

/// Maximum Levenshtein distance at which a spoken word still counts as the expected one.
pub const DEFAULT_TOLERANCE: usize = 2;

/// Points removed when the number of extra words equals the number of expected words.
pub const EXTRA_WORD_PENALTY_POINTS: f64 = 20.0;

/// Share of the content accuracy kept as order score when word order is broken.
pub const ORDER_PENALTY_FACTOR: f64 = 0.7;

pub const KEYWORD_WEIGHT: f64 = 0.4;
pub const SEMANTIC_WEIGHT: f64 = 0.4;
pub const TEXT_ACCURACY_WEIGHT: f64 = 0.2;

/// Settings for daily recommendation generation.
#[derive(Debug, Clone)]
pub struct RecommendationPolicy {
    /// Maximum number of activities in one day's set.
    pub max_items: usize,
    /// How far back the activity log is read when looking for weak spots.
    pub lookback_days: i64,
    /// Scores below this mark an activity (or subject) as needing review.
    pub review_score_threshold: f64,
    /// Cap on `review_missed` entries.
    pub max_review_items: usize,
    /// Cap on `weak_subject` entries.
    pub max_weak_subject_items: usize,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            max_items: 5,
            lookback_days: 14,
            review_score_threshold: 60.0,
            max_review_items: 2,
            max_weak_subject_items: 2,
        }
    }
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
