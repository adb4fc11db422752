//! services/api/src/web/progress.rs
//!
//! Axum handlers for the student and parent dashboards: today's recommendations,
//! which of them are done, and goal tracking.

use crate::error::reject;
use crate::web::rest::{
    CompletedSectionResponse, CompletedSectionsRequest, CreateGoalRequest, GoalRangeQuery,
    GoalResponse, RecommendationQuery, RecommendationSetResponse, SetGoalCompletedRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use classroom_core::domain::{GoalType, NewGoal};
use std::sync::Arc;
use uuid::Uuid;

/// Get (or create on first request of the day) the student's recommendation set.
#[utoipa::path(
    get,
    path = "/students/{student_id}/recommendations",
    tag = "Progress",
    params(
        ("student_id" = Uuid, Path, description = "The student."),
        RecommendationQuery
    ),
    responses(
        (status = 200, description = "Today's recommendations", body = RecommendationSetResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn daily_recommendations_handler(
    State(app_state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationSetResponse>, (StatusCode, String)> {
    let set = app_state
        .recommendations
        .get_or_generate_daily_recommendations(
            student_id,
            query.organization_id,
            query.date_of_birth,
            Utc::now(),
        )
        .await
        .map_err(|e| reject("Failed to load recommendations", e))?;
    Ok(Json(set.into()))
}

/// List which of the given recommended activities the student completed today.
#[utoipa::path(
    post,
    path = "/students/{student_id}/recommendations/completed",
    tag = "Progress",
    params(("student_id" = Uuid, Path, description = "The student.")),
    request_body = CompletedSectionsRequest,
    responses(
        (status = 200, description = "Completed activities", body = [CompletedSectionResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn completed_sections_handler(
    State(app_state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    Json(payload): Json<CompletedSectionsRequest>,
) -> Result<Json<Vec<CompletedSectionResponse>>, (StatusCode, String)> {
    let done = app_state
        .recommendations
        .get_today_completed_course_sections(student_id, &payload.game_ids, Utc::now())
        .await
        .map_err(|e| reject("Failed to load completed sections", e))?;
    Ok(Json(done.into_iter().map(Into::into).collect()))
}

/// List the student's goals in a date range with live progress.
#[utoipa::path(
    get,
    path = "/students/{student_id}/goals",
    tag = "Progress",
    params(
        ("student_id" = Uuid, Path, description = "The student."),
        GoalRangeQuery
    ),
    responses(
        (status = 200, description = "Goals with progress", body = [GoalResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_goals_handler(
    State(app_state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    Query(range): Query<GoalRangeQuery>,
) -> Result<Json<Vec<GoalResponse>>, (StatusCode, String)> {
    let goals = app_state
        .goals
        .get_goals_with_progress(student_id, range.start_date, range.end_date)
        .await
        .map_err(|e| reject("Failed to load goals", e))?;
    Ok(Json(goals.into_iter().map(Into::into).collect()))
}

/// Create a goal for the student.
#[utoipa::path(
    post,
    path = "/students/{student_id}/goals",
    tag = "Progress",
    params(("student_id" = Uuid, Path, description = "The student.")),
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Invalid goal"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_goal_handler(
    State(app_state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let goal_type = payload
        .goal_type
        .parse::<GoalType>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let new_goal = NewGoal {
        student_id,
        created_by: payload.created_by,
        goal_type,
        target_value: payload.target_value,
        target_game_id: payload.target_game_id,
        date_key: payload.date_key,
    };
    let goal = app_state
        .goals
        .add_goal_with_progress(new_goal)
        .await
        .map_err(|e| reject("Failed to create goal", e))?;
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

/// Mark a custom goal as done or not done.
#[utoipa::path(
    put,
    path = "/goals/{goal_id}/completed",
    tag = "Progress",
    params(("goal_id" = Uuid, Path, description = "The goal.")),
    request_body = SetGoalCompletedRequest,
    responses(
        (status = 200, description = "Updated goal", body = GoalResponse),
        (status = 400, description = "The goal is not a custom goal"),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn set_goal_completed_handler(
    State(app_state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<SetGoalCompletedRequest>,
) -> Result<Json<GoalResponse>, (StatusCode, String)> {
    let goal = app_state
        .goals
        .set_custom_goal_completed(goal_id, payload.completed)
        .await
        .map_err(|e| reject("Failed to update goal", e))?;
    Ok(Json(goal.into()))
}
