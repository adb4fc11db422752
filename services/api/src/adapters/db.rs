//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use classroom_core::domain::{
    Activity, ActivityRecord, DailyRecommendationSet, Goal, GoalType, NewGoal,
    RecommendedActivity,
};
use classroom_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const GOAL_COLUMNS: &str =
    "id, student_id, created_by, goal_type, target_value, target_game_id, date_key, completed, created_at";

#[derive(FromRow)]
struct GoalRecord {
    id: Uuid,
    student_id: Uuid,
    created_by: Uuid,
    goal_type: String,
    target_value: Option<i32>,
    target_game_id: Option<Uuid>,
    date_key: NaiveDate,
    completed: bool,
    created_at: DateTime<Utc>,
}
impl GoalRecord {
    fn to_domain(self) -> PortResult<Goal> {
        let goal_type = self
            .goal_type
            .parse::<GoalType>()
            .map_err(PortError::Unexpected)?;
        Ok(Goal {
            id: self.id,
            student_id: self.student_id,
            created_by: self.created_by,
            goal_type,
            target_value: self.target_value,
            target_game_id: self.target_game_id,
            date_key: self.date_key,
            completed: self.completed,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ActivityRecordRow {
    id: Uuid,
    student_id: Uuid,
    game_id: Uuid,
    started_on: DateTime<Utc>,
    completed_on: Option<DateTime<Utc>>,
    stars: i32,
    score: f64,
}
impl ActivityRecordRow {
    fn to_domain(self) -> ActivityRecord {
        ActivityRecord {
            id: self.id,
            student_id: self.student_id,
            game_id: self.game_id,
            started_on: self.started_on,
            completed_on: self.completed_on,
            stars: self.stars,
            score: self.score,
        }
    }
}

#[derive(FromRow)]
struct ActivityRow {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    subject: String,
    min_age: Option<i32>,
    max_age: Option<i32>,
    created_at: DateTime<Utc>,
}
impl ActivityRow {
    fn to_domain(self) -> Activity {
        Activity {
            id: self.id,
            organization_id: self.organization_id,
            title: self.title,
            subject: self.subject,
            min_age: self.min_age,
            max_age: self.max_age,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct RecommendationSetRecord {
    student_id: Uuid,
    organization_id: Uuid,
    generated_on: NaiveDate,
    generated_at: DateTime<Utc>,
    items: Json<Vec<RecommendedActivity>>,
    expires_on: DateTime<Utc>,
}
impl RecommendationSetRecord {
    fn to_domain(self) -> DailyRecommendationSet {
        DailyRecommendationSet {
            student_id: self.student_id,
            organization_id: self.organization_id,
            generated_on: self.generated_on,
            generated_at: self.generated_at,
            items: self.items.0,
            expires_on: self.expires_on,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal> {
        let record = sqlx::query_as::<_, GoalRecord>(&format!(
            "INSERT INTO goals (id, student_id, created_by, goal_type, target_value, target_game_id, date_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            GOAL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(goal.student_id)
        .bind(goal.created_by)
        .bind(goal.goal_type.as_str())
        .bind(goal.target_value)
        .bind(goal.target_game_id)
        .bind(goal.date_key)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal> {
        let record = sqlx::query_as::<_, GoalRecord>(&format!(
            "SELECT {} FROM goals WHERE id = $1",
            GOAL_COLUMNS
        ))
        .bind(goal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Goal {} not found", goal_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn list_goals_between(
        &self,
        student_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PortResult<Vec<Goal>> {
        let records = sqlx::query_as::<_, GoalRecord>(&format!(
            "SELECT {} FROM goals WHERE student_id = $1 AND date_key BETWEEN $2 AND $3 \
             ORDER BY date_key ASC, created_at ASC",
            GOAL_COLUMNS
        ))
        .bind(student_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_goal_completed(&self, goal_id: Uuid, completed: bool) -> PortResult<Goal> {
        let record = sqlx::query_as::<_, GoalRecord>(&format!(
            "UPDATE goals SET completed = $1 WHERE id = $2 RETURNING {}",
            GOAL_COLUMNS
        ))
        .bind(completed)
        .bind(goal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Goal {} not found", goal_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn list_activity_records(
        &self,
        student_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>> {
        let records = sqlx::query_as::<_, ActivityRecordRow>(
            "SELECT id, student_id, game_id, started_on, completed_on, stars, score \
             FROM activity_records \
             WHERE student_id = $1 AND started_on >= $2 AND started_on < $3 \
             ORDER BY started_on ASC",
        )
        .bind(student_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_completed_records(
        &self,
        student_id: Uuid,
        game_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>> {
        let records = sqlx::query_as::<_, ActivityRecordRow>(
            "SELECT id, student_id, game_id, started_on, completed_on, stars, score \
             FROM activity_records \
             WHERE student_id = $1 AND game_id = ANY($2) \
               AND completed_on >= $3 AND completed_on < $4 \
             ORDER BY completed_on ASC",
        )
        .bind(student_id)
        .bind(game_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_activities(&self, organization_id: Uuid) -> PortResult<Vec<Activity>> {
        let records = sqlx::query_as::<_, ActivityRow>(
            "SELECT id, organization_id, title, subject, min_age, max_age, created_at \
             FROM activities WHERE organization_id = $1 ORDER BY title ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_recommendation_set(
        &self,
        student_id: Uuid,
        day: NaiveDate,
    ) -> PortResult<Option<DailyRecommendationSet>> {
        let record = sqlx::query_as::<_, RecommendationSetRecord>(
            "SELECT student_id, organization_id, generated_on, generated_at, items, expires_on \
             FROM daily_recommendations WHERE student_id = $1 AND generated_on = $2",
        )
        .bind(student_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(|r| r.to_domain()))
    }

    async fn insert_recommendation_set(&self, set: &DailyRecommendationSet) -> PortResult<()> {
        // The unique key on (student_id, generated_on) turns a concurrent insert into a
        // no-op; only an expired row may be overwritten.
        let result = sqlx::query(
            "INSERT INTO daily_recommendations \
                 (student_id, organization_id, generated_on, generated_at, items, expires_on) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (student_id, generated_on) DO UPDATE SET \
                 organization_id = EXCLUDED.organization_id, \
                 generated_at = EXCLUDED.generated_at, \
                 items = EXCLUDED.items, \
                 expires_on = EXCLUDED.expires_on \
             WHERE daily_recommendations.expires_on <= EXCLUDED.generated_at",
        )
        .bind(set.student_id)
        .bind(set.organization_id)
        .bind(set.generated_on)
        .bind(set.generated_at)
        .bind(Json(&set.items))
        .bind(set.expires_on)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            debug!(student_id = %set.student_id, day = %set.generated_on, "Live recommendation set already stored");
            return Err(PortError::Conflict(format!(
                "Recommendations for student {} on {} already exist",
                set.student_id, set.generated_on
            )));
        }
        Ok(())
    }
}
