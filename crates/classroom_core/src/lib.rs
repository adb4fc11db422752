pub mod domain;
pub mod engine;
pub mod error;
pub mod policy;
pub mod ports;
pub mod scoring;

pub use domain::{
    Activity, ActivityRecord, CompositeScore, DailyRecommendationSet, Goal, GoalType,
    GoalWithProgress, NewGoal, RecommendationReason, RecommendedActivity,
    RecommendedCourseResult, ScoringResult, SpeechScore,
};
pub use engine::{GoalTracker, RecommendationEngine};
pub use error::{CoreError, CoreResult};
pub use policy::RecommendationPolicy;
pub use ports::{
    DatabaseService, PortError, PortResult, SentenceSimilarityService, SpeechToTextService,
};
pub use scoring::{score_speech, score_text, score_text_default, AnswerGrader};
