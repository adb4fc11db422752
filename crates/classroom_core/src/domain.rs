//! crates/classroom_core/src/domain.rs
//!
//! Defines the pure, core data structures for the scoring and recommendation engine.
//! These structs are independent of any database or web framework.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Scoring Results
//=========================================================================================

/// A normalized word together with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    pub text: String,
    pub position: usize,
}

/// The outcome of comparing a spoken or typed transcript with a reference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub percentage: f64,
    pub order_percentage: f64,
    pub missed_words: Vec<String>,
    pub extra_words: Vec<String>,
    pub total_words: usize,
    pub correct_words: usize,
}

/// A weighted blend of keyword, semantic and text-accuracy signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub total_score: f64,
    pub keyword_score: f64,
    pub semantic_score: f64,
    pub text_accuracy_score: f64,
}

/// A transcript produced from an audio answer and its accuracy against the expected text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechScore {
    pub transcript: String,
    pub result: ScoringResult,
}

//=========================================================================================
// Goals
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    StudyTime,
    Course,
    Stars,
    Custom,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::StudyTime => "study_time",
            GoalType::Course => "course",
            GoalType::Stars => "stars",
            GoalType::Custom => "custom",
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study_time" => Ok(GoalType::StudyTime),
            "course" => Ok(GoalType::Course),
            "stars" => Ok(GoalType::Stars),
            "custom" => Ok(GoalType::Custom),
            other => Err(format!("unknown goal type '{}'", other)),
        }
    }
}

/// A student's target for one calendar day.
///
/// `completed` is only meaningful for `GoalType::Custom`; every other type has its
/// progress recomputed from the activity log on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub student_id: Uuid,
    pub created_by: Uuid,
    pub goal_type: GoalType,
    pub target_value: Option<i32>,
    pub target_game_id: Option<Uuid>,
    pub date_key: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when creating a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub student_id: Uuid,
    pub created_by: Uuid,
    pub goal_type: GoalType,
    pub target_value: Option<i32>,
    pub target_game_id: Option<Uuid>,
    pub date_key: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithProgress {
    #[serde(flatten)]
    pub goal: Goal,
    pub current_progress: f64,
    pub calculated_completed: bool,
}

//=========================================================================================
// Activities and the Activity Log
//=========================================================================================

/// A playable unit of content (a game or course section) in an organization's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub subject: String,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Whether the activity suits a student of the given age. Unknown ages always fit.
    pub fn suits_age(&self, age: Option<i32>) -> bool {
        let Some(age) = age else {
            return true;
        };
        self.min_age.map_or(true, |min| age >= min) && self.max_age.map_or(true, |max| age <= max)
    }
}

/// One play session of one student on one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub game_id: Uuid,
    pub started_on: DateTime<Utc>,
    pub completed_on: Option<DateTime<Utc>>,
    pub stars: i32,
    pub score: f64,
}

impl ActivityRecord {
    /// Minutes between start and completion; zero for sessions never completed.
    pub fn duration_minutes(&self) -> f64 {
        match self.completed_on {
            Some(done) if done > self.started_on => {
                (done - self.started_on).num_seconds() as f64 / 60.0
            }
            _ => 0.0,
        }
    }
}

//=========================================================================================
// Daily Recommendations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    /// Replay of an activity the student recently scored poorly on.
    ReviewMissed,
    /// Unplayed content in a subject where recent scores are low.
    WeakSubject,
    /// Content the student has never played.
    NewContent,
    /// Filler chosen only because it fits the student's age.
    AgeAppropriate,
}

impl RecommendationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationReason::ReviewMissed => "review_missed",
            RecommendationReason::WeakSubject => "weak_subject",
            RecommendationReason::NewContent => "new_content",
            RecommendationReason::AgeAppropriate => "age_appropriate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedActivity {
    pub game_id: Uuid,
    pub title: String,
    pub subject: String,
    pub reason: RecommendationReason,
}

/// The day-scoped list of suggested activities for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecommendationSet {
    pub student_id: Uuid,
    pub organization_id: Uuid,
    pub generated_on: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<RecommendedActivity>,
    pub expires_on: DateTime<Utc>,
}

impl DailyRecommendationSet {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_on <= now
    }
}

/// A recommended activity the student has already completed today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCourseResult {
    pub game_id: Uuid,
    pub completed_on: DateTime<Utc>,
    pub stars: i32,
    pub score: f64,
    pub attempts: usize,
}
