//! In-memory fakes of the core ports, shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use classroom_core::domain::{
    Activity, ActivityRecord, DailyRecommendationSet, Goal, NewGoal,
};
use classroom_core::ports::{
    DatabaseService, PortError, PortResult, SentenceSimilarityService, SpeechToTextService,
};
use uuid::Uuid;

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, day, hour, minute, 0).unwrap()
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, day).unwrap()
}

#[derive(Default)]
pub struct InMemoryDb {
    pub goals: Mutex<Vec<Goal>>,
    pub records: Mutex<Vec<ActivityRecord>>,
    pub activities: Mutex<Vec<Activity>>,
    pub sets: Mutex<HashMap<(Uuid, NaiveDate), DailyRecommendationSet>>,
    pub insert_calls: AtomicU32,
    pub record_queries: AtomicU32,
    /// Makes the next set lookup miss, as if another request had not yet committed.
    pub hide_next_lookup: AtomicBool,
    pub offline: AtomicBool,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(
        &self,
        student_id: Uuid,
        game_id: Uuid,
        started_on: DateTime<Utc>,
        minutes: Option<i64>,
        stars: i32,
        score: f64,
    ) {
        self.records.lock().unwrap().push(ActivityRecord {
            id: Uuid::new_v4(),
            student_id,
            game_id,
            started_on,
            completed_on: minutes.map(|m| started_on + chrono::Duration::minutes(m)),
            stars,
            score,
        });
    }

    pub fn add_activity(&self, organization_id: Uuid, title: &str, subject: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.activities.lock().unwrap().push(Activity {
            id,
            organization_id,
            title: title.to_string(),
            subject: subject.to_string(),
            min_age: None,
            max_age: None,
            created_at: at(1, 0, 0),
        });
        id
    }

    fn check_online(&self) -> PortResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal> {
        self.check_online()?;
        let goal = Goal {
            id: Uuid::new_v4(),
            student_id: goal.student_id,
            created_by: goal.created_by,
            goal_type: goal.goal_type,
            target_value: goal.target_value,
            target_game_id: goal.target_game_id,
            date_key: goal.date_key,
            completed: false,
            created_at: Utc::now(),
        };
        self.goals.lock().unwrap().push(goal.clone());
        Ok(goal)
    }

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal> {
        self.check_online()?;
        self.goals
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == goal_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Goal {} not found", goal_id)))
    }

    async fn list_goals_between(
        &self,
        student_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PortResult<Vec<Goal>> {
        self.check_online()?;
        Ok(self
            .goals
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.student_id == student_id && g.date_key >= start && g.date_key <= end)
            .cloned()
            .collect())
    }

    async fn set_goal_completed(&self, goal_id: Uuid, completed: bool) -> PortResult<Goal> {
        self.check_online()?;
        let mut goals = self.goals.lock().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| PortError::NotFound(format!("Goal {} not found", goal_id)))?;
        goal.completed = completed;
        Ok(goal.clone())
    }

    async fn list_activity_records(
        &self,
        student_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>> {
        self.check_online()?;
        self.record_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.student_id == student_id && r.started_on >= from && r.started_on < to)
            .cloned()
            .collect())
    }

    async fn list_completed_records(
        &self,
        student_id: Uuid,
        game_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PortResult<Vec<ActivityRecord>> {
        self.check_online()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.student_id == student_id && game_ids.contains(&r.game_id))
            .filter(|r| r.completed_on.map_or(false, |done| done >= from && done < to))
            .cloned()
            .collect())
    }

    async fn list_activities(&self, organization_id: Uuid) -> PortResult<Vec<Activity>> {
        self.check_online()?;
        Ok(self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_recommendation_set(
        &self,
        student_id: Uuid,
        day: NaiveDate,
    ) -> PortResult<Option<DailyRecommendationSet>> {
        self.check_online()?;
        if self.hide_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.sets.lock().unwrap().get(&(student_id, day)).cloned())
    }

    async fn insert_recommendation_set(&self, set: &DailyRecommendationSet) -> PortResult<()> {
        self.check_online()?;
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut sets = self.sets.lock().unwrap();
        let key = (set.student_id, set.generated_on);
        if let Some(existing) = sets.get(&key) {
            if !existing.is_expired(set.generated_at) {
                return Err(PortError::Conflict(format!(
                    "recommendations for {} on {}",
                    set.student_id, set.generated_on
                )));
            }
        }
        sets.insert(key, set.clone());
        Ok(())
    }
}

/// Returns the same similarity for every candidate.
pub struct FixedSimilarity(pub f32);

#[async_trait]
impl SentenceSimilarityService for FixedSimilarity {
    async fn similarity(&self, _source: &str, candidates: &[String]) -> PortResult<Vec<f32>> {
        Ok(vec![self.0; candidates.len()])
    }
}

pub struct UnavailableSimilarity;

#[async_trait]
impl SentenceSimilarityService for UnavailableSimilarity {
    async fn similarity(&self, _source: &str, _candidates: &[String]) -> PortResult<Vec<f32>> {
        Err(PortError::Unexpected("embedding service timed out".to_string()))
    }
}

/// Ignores the audio and returns a canned transcript.
pub struct CannedTranscriber(pub Option<String>);

#[async_trait]
impl SpeechToTextService for CannedTranscriber {
    async fn transcribe_audio(&self, _audio_data: &[u8]) -> PortResult<String> {
        self.0
            .clone()
            .ok_or_else(|| PortError::Unexpected("transcription unavailable".to_string()))
    }
}
