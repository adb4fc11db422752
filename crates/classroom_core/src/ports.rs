//! crates/classroom_core/src/ports.rs
//!
//! Defines the service contracts (traits) the engine depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the scoring
//! and recommendation logic independent of the database and the AI services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Activity, ActivityRecord, DailyRecommendationSet, Goal, NewGoal};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflicting record: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Goals ---
    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal>;

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal>;

    /// Goals whose `date_key` lies in `[start, end]`, ordered by date then creation time.
    async fn list_goals_between(
        &self,
        student_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PortResult<Vec<Goal>>;

    async fn set_goal_completed(&self, goal_id: Uuid, completed: bool) -> PortResult<Goal>;

    // --- Activity Log ---
    /// Records whose `started_on` lies in `[from, to)`.
    async fn list_activity_records(
        &self,
        student_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>>;

    /// Records for the given games whose `completed_on` lies in `[from, to)`.
    async fn list_completed_records(
        &self,
        student_id: Uuid,
        game_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>>;

    // --- Catalog ---
    async fn list_activities(&self, organization_id: Uuid) -> PortResult<Vec<Activity>>;

    // --- Daily Recommendations ---
    async fn find_recommendation_set(
        &self,
        student_id: Uuid,
        day: NaiveDate,
    ) -> PortResult<Option<DailyRecommendationSet>>;

    /// Stores a set keyed by `(student_id, generated_on)`.
    ///
    /// An expired set under the same key is replaced. A live one is left untouched and
    /// the call fails with `PortError::Conflict`.
    async fn insert_recommendation_set(&self, set: &DailyRecommendationSet) -> PortResult<()>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait SentenceSimilarityService: Send + Sync {
    /// Scores each candidate against the source sentence, one value in `[0, 1]` per candidate.
    async fn similarity(&self, source: &str, candidates: &[String]) -> PortResult<Vec<f32>>;
}
