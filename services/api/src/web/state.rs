//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use classroom_core::ports::{DatabaseService, SentenceSimilarityService, SpeechToTextService};
use classroom_core::{AnswerGrader, GoalTracker, RecommendationEngine, RecommendationPolicy};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sst_adapter: Arc<dyn SpeechToTextService>,
    pub grader: AnswerGrader,
    pub recommendations: RecommendationEngine,
    pub goals: GoalTracker,
}

impl AppState {
    /// Wires the engine components to their collaborators.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        sst_adapter: Arc<dyn SpeechToTextService>,
        similarity_adapter: Arc<dyn SentenceSimilarityService>,
    ) -> Self {
        let policy = RecommendationPolicy {
            max_items: config.recommendation_max_items,
            lookback_days: config.recommendation_lookback_days,
            ..RecommendationPolicy::default()
        };
        Self {
            config,
            sst_adapter,
            grader: AnswerGrader::new(similarity_adapter),
            recommendations: RecommendationEngine::new(db.clone(), policy),
            goals: GoalTracker::new(db),
        }
    }
}
