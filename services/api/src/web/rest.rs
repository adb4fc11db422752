//! services/api/src/web/rest.rs
//!
//! Request/response payloads of the REST API and the master definition for the
//! OpenAPI specification.

use chrono::{DateTime, NaiveDate, Utc};
use classroom_core::domain::{
    CompositeScore, DailyRecommendationSet, GoalWithProgress, RecommendedActivity,
    RecommendedCourseResult, ScoringResult, SpeechScore,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{progress, scoring};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        scoring::score_text_handler,
        scoring::grade_answer_handler,
        scoring::score_speech_handler,
        progress::daily_recommendations_handler,
        progress::completed_sections_handler,
        progress::list_goals_handler,
        progress::create_goal_handler,
        progress::set_goal_completed_handler,
    ),
    components(
        schemas(
            ScoreTextRequest, ScoringResultResponse, GradeAnswerRequest, CompositeScoreResponse,
            SpeechScoreResponse, RecommendationSetResponse, RecommendedActivityResponse,
            CompletedSectionsRequest, CompletedSectionResponse, CreateGoalRequest,
            SetGoalCompletedRequest, GoalResponse
        )
    ),
    tags(
        (name = "Scoring", description = "Text, answer and speech accuracy scoring."),
        (name = "Progress", description = "Daily recommendations and goal tracking.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Scoring Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ScoreTextRequest {
    pub original: String,
    pub spoken: String,
    /// Maximum edit distance for a word to still count; defaults to 2.
    pub tolerance: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct ScoringResultResponse {
    pub percentage: f64,
    pub order_percentage: f64,
    pub missed_words: Vec<String>,
    pub extra_words: Vec<String>,
    pub total_words: usize,
    pub correct_words: usize,
}

impl From<ScoringResult> for ScoringResultResponse {
    fn from(result: ScoringResult) -> Self {
        Self {
            percentage: result.percentage,
            order_percentage: result.order_percentage,
            missed_words: result.missed_words,
            extra_words: result.extra_words,
            total_words: result.total_words,
            correct_words: result.correct_words,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct GradeAnswerRequest {
    /// The reference answer.
    pub answer: String,
    /// The student's answer.
    pub my_answer: String,
    #[serde(default)]
    pub key_words: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CompositeScoreResponse {
    pub total_score: f64,
    pub keyword_score: f64,
    pub semantic_score: f64,
    pub text_accuracy_score: f64,
}

impl From<CompositeScore> for CompositeScoreResponse {
    fn from(score: CompositeScore) -> Self {
        Self {
            total_score: score.total_score,
            keyword_score: score.keyword_score,
            semantic_score: score.semantic_score,
            text_accuracy_score: score.text_accuracy_score,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SpeechScoreResponse {
    pub transcript: String,
    pub result: ScoringResultResponse,
}

impl From<SpeechScore> for SpeechScoreResponse {
    fn from(score: SpeechScore) -> Self {
        Self {
            transcript: score.transcript,
            result: score.result.into(),
        }
    }
}

//=========================================================================================
// Recommendation Payloads
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    pub organization_id: Uuid,
    /// Used to filter content by age; omitted means no age filter.
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct RecommendedActivityResponse {
    pub game_id: Uuid,
    pub title: String,
    pub subject: String,
    /// One of `review_missed`, `weak_subject`, `new_content`, `age_appropriate`.
    pub reason: String,
}

impl From<RecommendedActivity> for RecommendedActivityResponse {
    fn from(item: RecommendedActivity) -> Self {
        Self {
            game_id: item.game_id,
            title: item.title,
            subject: item.subject,
            reason: item.reason.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RecommendationSetResponse {
    pub student_id: Uuid,
    pub organization_id: Uuid,
    pub generated_on: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub expires_on: DateTime<Utc>,
    pub items: Vec<RecommendedActivityResponse>,
}

impl From<DailyRecommendationSet> for RecommendationSetResponse {
    fn from(set: DailyRecommendationSet) -> Self {
        Self {
            student_id: set.student_id,
            organization_id: set.organization_id,
            generated_on: set.generated_on,
            generated_at: set.generated_at,
            expires_on: set.expires_on,
            items: set.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CompletedSectionsRequest {
    /// Today's recommended activity ids.
    pub game_ids: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct CompletedSectionResponse {
    pub game_id: Uuid,
    pub completed_on: DateTime<Utc>,
    pub stars: i32,
    pub score: f64,
    pub attempts: usize,
}

impl From<RecommendedCourseResult> for CompletedSectionResponse {
    fn from(result: RecommendedCourseResult) -> Self {
        Self {
            game_id: result.game_id,
            completed_on: result.completed_on,
            stars: result.stars,
            score: result.score,
            attempts: result.attempts,
        }
    }
}

//=========================================================================================
// Goal Payloads
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoalRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGoalRequest {
    /// The student or guardian creating the goal.
    pub created_by: Uuid,
    /// One of `study_time`, `course`, `stars`, `custom`.
    pub goal_type: String,
    pub target_value: Option<i32>,
    pub target_game_id: Option<Uuid>,
    pub date_key: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct SetGoalCompletedRequest {
    pub completed: bool,
}

#[derive(Serialize, ToSchema)]
pub struct GoalResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub created_by: Uuid,
    pub goal_type: String,
    pub target_value: Option<i32>,
    pub target_game_id: Option<Uuid>,
    pub date_key: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub current_progress: f64,
    pub calculated_completed: bool,
}

impl From<GoalWithProgress> for GoalResponse {
    fn from(entry: GoalWithProgress) -> Self {
        let goal = entry.goal;
        Self {
            id: goal.id,
            student_id: goal.student_id,
            created_by: goal.created_by,
            goal_type: goal.goal_type.as_str().to_string(),
            target_value: goal.target_value,
            target_game_id: goal.target_game_id,
            date_key: goal.date_key,
            completed: goal.completed,
            created_at: goal.created_at,
            current_progress: entry.current_progress,
            calculated_completed: entry.calculated_completed,
        }
    }
}
