//! crates/classroom_core/src/engine/goals.rs
//!
//! Goal tracking. Progress is recomputed from the activity log on every read, so goals
//! created after the activity happened still get credit and nothing drifts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ActivityRecord, Goal, GoalType, GoalWithProgress, NewGoal};
use crate::engine::day_bounds;
use crate::error::{CoreError, CoreResult};
use crate::ports::DatabaseService;

#[derive(Clone)]
pub struct GoalTracker {
    db: Arc<dyn DatabaseService>,
}

impl GoalTracker {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// All goals dated within `[start_date, end_date]`, each with live progress.
    pub async fn get_goals_with_progress(
        &self,
        student_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CoreResult<Vec<GoalWithProgress>> {
        if start_date > end_date {
            return Ok(Vec::new());
        }
        let goals = self
            .db
            .list_goals_between(student_id, start_date, end_date)
            .await
            .map_err(CoreError::Persistence)?;

        // One log query per distinct day.
        let mut records_by_day: HashMap<NaiveDate, Vec<ActivityRecord>> = HashMap::new();
        let mut with_progress = Vec::with_capacity(goals.len());
        for goal in goals {
            if goal.goal_type == GoalType::Custom {
                with_progress.push(evaluate_goal(goal, &[]));
                continue;
            }
            if !records_by_day.contains_key(&goal.date_key) {
                let records = self.records_for_day(student_id, goal.date_key).await?;
                records_by_day.insert(goal.date_key, records);
            }
            let records = records_by_day
                .get(&goal.date_key)
                .map(Vec::as_slice)
                .unwrap_or_default();
            with_progress.push(evaluate_goal(goal, records));
        }

        debug!(%student_id, goals = with_progress.len(), "Computed goal progress");
        Ok(with_progress)
    }

    /// Inserts a goal and returns it with its current progress. Duplicates are allowed.
    pub async fn add_goal_with_progress(&self, new_goal: NewGoal) -> CoreResult<GoalWithProgress> {
        validate_new_goal(&new_goal)?;
        let goal = self
            .db
            .create_goal(new_goal)
            .await
            .map_err(CoreError::Persistence)?;
        info!(
            goal_id = %goal.id,
            student_id = %goal.student_id,
            goal_type = goal.goal_type.as_str(),
            date = %goal.date_key,
            "Goal created"
        );
        self.with_progress(goal).await
    }

    /// Sets the manual completion flag. Only custom goals carry one.
    pub async fn set_custom_goal_completed(
        &self,
        goal_id: Uuid,
        completed: bool,
    ) -> CoreResult<GoalWithProgress> {
        let goal = self
            .db
            .get_goal_by_id(goal_id)
            .await
            .map_err(CoreError::Persistence)?;
        if goal.goal_type != GoalType::Custom {
            return Err(CoreError::Validation(format!(
                "goal {} is a {} goal; only custom goals can be completed manually",
                goal_id,
                goal.goal_type.as_str()
            )));
        }
        let goal = self
            .db
            .set_goal_completed(goal_id, completed)
            .await
            .map_err(CoreError::Persistence)?;
        Ok(evaluate_goal(goal, &[]))
    }

    async fn with_progress(&self, goal: Goal) -> CoreResult<GoalWithProgress> {
        if goal.goal_type == GoalType::Custom {
            return Ok(evaluate_goal(goal, &[]));
        }
        let records = self.records_for_day(goal.student_id, goal.date_key).await?;
        Ok(evaluate_goal(goal, &records))
    }

    async fn records_for_day(
        &self,
        student_id: Uuid,
        day: NaiveDate,
    ) -> CoreResult<Vec<ActivityRecord>> {
        let (from, to) = day_bounds(day);
        self.db
            .list_activity_records(student_id, from, to)
            .await
            .map_err(CoreError::Persistence)
    }
}

fn validate_new_goal(goal: &NewGoal) -> CoreResult<()> {
    if matches!(goal.target_value, Some(value) if value < 0) {
        return Err(CoreError::Validation(
            "target value must not be negative".to_string(),
        ));
    }
    if goal.goal_type == GoalType::Course && goal.target_game_id.is_none() {
        return Err(CoreError::Validation(
            "course goals need a target game".to_string(),
        ));
    }
    Ok(())
}

/// Computes progress for one goal from the records that started on its day.
///
/// `records` must already be limited to the goal's student and day window.
pub fn evaluate_goal(goal: Goal, records: &[ActivityRecord]) -> GoalWithProgress {
    let reaches_target =
        |progress: f64| goal.target_value.map_or(false, |target| progress >= f64::from(target));

    let (current_progress, calculated_completed) = match goal.goal_type {
        GoalType::StudyTime => {
            let minutes: f64 = records.iter().map(ActivityRecord::duration_minutes).sum();
            (minutes, reaches_target(minutes))
        }
        GoalType::Stars => {
            let stars = records.iter().map(|r| i64::from(r.stars)).sum::<i64>() as f64;
            (stars, reaches_target(stars))
        }
        GoalType::Course => {
            let done = goal.target_game_id.map_or(false, |game_id| {
                records
                    .iter()
                    .any(|r| r.game_id == game_id && r.completed_on.is_some())
            });
            (if done { 1.0 } else { 0.0 }, done)
        }
        GoalType::Custom => (if goal.completed { 1.0 } else { 0.0 }, goal.completed),
    };

    GoalWithProgress {
        goal,
        current_progress,
        calculated_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn goal(goal_type: GoalType, target_value: Option<i32>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            student_id: Uuid::nil(),
            created_by: Uuid::nil(),
            goal_type,
            target_value,
            target_game_id: None,
            date_key: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            completed: false,
            created_at: Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap(),
        }
    }

    fn session(game_id: Uuid, minutes: i64, stars: i32) -> ActivityRecord {
        let started = Utc.with_ymd_and_hms(2026, 4, 2, 15, 0, 0).unwrap();
        ActivityRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::nil(),
            game_id,
            started_on: started,
            completed_on: Some(started + Duration::minutes(minutes)),
            stars,
            score: 80.0,
        }
    }

    #[test]
    fn stars_goal_sums_stars() {
        let records = vec![session(Uuid::new_v4(), 5, 2), session(Uuid::new_v4(), 5, 1)];
        let result = evaluate_goal(goal(GoalType::Stars, Some(3)), &records);
        assert_eq!(result.current_progress, 3.0);
        assert!(result.calculated_completed);
    }

    #[test]
    fn stars_total_does_not_overflow() {
        let records = vec![
            session(Uuid::new_v4(), 5, i32::MAX),
            session(Uuid::new_v4(), 5, i32::MAX),
        ];
        let result = evaluate_goal(goal(GoalType::Stars, Some(i32::MAX)), &records);
        assert_eq!(result.current_progress, 2.0 * f64::from(i32::MAX));
        assert!(result.calculated_completed);
    }

    #[test]
    fn goal_without_target_never_completes() {
        let records = vec![session(Uuid::new_v4(), 90, 3)];
        let result = evaluate_goal(goal(GoalType::StudyTime, None), &records);
        assert_eq!(result.current_progress, 90.0);
        assert!(!result.calculated_completed);
    }

    #[test]
    fn unfinished_sessions_add_no_study_time() {
        let mut open = session(Uuid::new_v4(), 0, 0);
        open.completed_on = None;
        let result = evaluate_goal(goal(GoalType::StudyTime, Some(1)), &[open]);
        assert_eq!(result.current_progress, 0.0);
        assert!(!result.calculated_completed);
    }

    #[test]
    fn course_goal_needs_completed_target_game() {
        let game_id = Uuid::new_v4();
        let mut course = goal(GoalType::Course, None);
        course.target_game_id = Some(game_id);

        let mut unfinished = session(game_id, 10, 0);
        unfinished.completed_on = None;
        let pending = evaluate_goal(course.clone(), &[unfinished, session(Uuid::new_v4(), 10, 3)]);
        assert_eq!(pending.current_progress, 0.0);
        assert!(!pending.calculated_completed);

        let done = evaluate_goal(course, &[session(game_id, 10, 3)]);
        assert_eq!(done.current_progress, 1.0);
        assert!(done.calculated_completed);
    }

    #[test]
    fn validation_rejects_bad_goals() {
        let base = NewGoal {
            student_id: Uuid::nil(),
            created_by: Uuid::nil(),
            goal_type: GoalType::Stars,
            target_value: Some(-1),
            target_game_id: None,
            date_key: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
        };
        assert!(matches!(validate_new_goal(&base), Err(CoreError::Validation(_))));

        let course = NewGoal {
            goal_type: GoalType::Course,
            target_value: None,
            ..base.clone()
        };
        assert!(matches!(validate_new_goal(&course), Err(CoreError::Validation(_))));

        let custom = NewGoal {
            goal_type: GoalType::Custom,
            target_value: None,
            ..base
        };
        assert!(validate_new_goal(&custom).is_ok());
    }
}
