//! crates/classroom_core/src/engine/recommendations.rs
//!
//! Daily recommendation sets: generated once per student per calendar day (UTC),
//! persisted before being returned, and served unchanged until they expire.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityRecord, DailyRecommendationSet, RecommendationReason, RecommendedActivity,
    RecommendedCourseResult,
};
use crate::engine::day_bounds;
use crate::error::{CoreError, CoreResult};
use crate::policy::RecommendationPolicy;
use crate::ports::{DatabaseService, PortError};

#[derive(Clone)]
pub struct RecommendationEngine {
    db: Arc<dyn DatabaseService>,
    policy: RecommendationPolicy,
}

impl RecommendationEngine {
    pub fn new(db: Arc<dyn DatabaseService>, policy: RecommendationPolicy) -> Self {
        Self { db, policy }
    }

    /// Returns today's set for the student, generating and storing it on first request.
    ///
    /// When two requests race to create the same day's set, the store's uniqueness
    /// constraint rejects the second insert and the stored set is returned instead.
    pub async fn get_or_generate_daily_recommendations(
        &self,
        student_id: Uuid,
        organization_id: Uuid,
        date_of_birth: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> CoreResult<DailyRecommendationSet> {
        let today = now.date_naive();

        if let Some(existing) = self
            .db
            .find_recommendation_set(student_id, today)
            .await
            .map_err(CoreError::Persistence)?
        {
            if !existing.is_expired(now) {
                debug!(%student_id, %today, "Serving stored recommendation set");
                return Ok(existing);
            }
            info!(%student_id, %today, "Stored recommendation set expired, regenerating");
        }

        let set = self
            .generate(student_id, organization_id, date_of_birth, now)
            .await?;

        match self.db.insert_recommendation_set(&set).await {
            Ok(()) => {
                info!(
                    %student_id,
                    %today,
                    items = set.items.len(),
                    "Generated daily recommendations"
                );
                Ok(set)
            }
            Err(PortError::Conflict(reason)) => {
                debug!(%student_id, %today, %reason, "Lost recommendation race, re-fetching");
                self.db
                    .find_recommendation_set(student_id, today)
                    .await
                    .map_err(CoreError::Persistence)?
                    .ok_or_else(|| {
                        CoreError::Persistence(PortError::NotFound(format!(
                            "Recommendation set for student {} on {}",
                            student_id, today
                        )))
                    })
            }
            Err(e) => Err(CoreError::Persistence(e)),
        }
    }

    /// Which of today's recommended activities the student has already completed.
    pub async fn get_today_completed_course_sections(
        &self,
        student_id: Uuid,
        recommended_game_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<RecommendedCourseResult>> {
        if recommended_game_ids.is_empty() {
            return Ok(Vec::new());
        }
        let (from, to) = day_bounds(now.date_naive());
        let records = self
            .db
            .list_completed_records(student_id, recommended_game_ids, from, to)
            .await
            .map_err(CoreError::Persistence)?;

        Ok(summarize_completions(&records, recommended_game_ids))
    }

    async fn generate(
        &self,
        student_id: Uuid,
        organization_id: Uuid,
        date_of_birth: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> CoreResult<DailyRecommendationSet> {
        let today = now.date_naive();
        let catalog = self
            .db
            .list_activities(organization_id)
            .await
            .map_err(CoreError::Persistence)?;

        let (_, end_of_today) = day_bounds(today);
        let history = self
            .db
            .list_activity_records(
                student_id,
                end_of_today - Duration::days(self.policy.lookback_days + 1),
                end_of_today,
            )
            .await
            .map_err(CoreError::Persistence)?;

        let age = date_of_birth.and_then(|dob| age_on(dob, today));
        let items = select_activities(&catalog, &history, age, &self.policy);

        Ok(DailyRecommendationSet {
            student_id,
            organization_id,
            generated_on: today,
            generated_at: now,
            items,
            expires_on: end_of_today,
        })
    }
}

/// Full years between `date_of_birth` and `on`; `None` for birth dates in the future.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> Option<i32> {
    if date_of_birth > on {
        return None;
    }
    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    Some(years)
}

/// Deterministic selection: the same catalog and history always give the same list.
pub fn select_activities(
    catalog: &[Activity],
    history: &[ActivityRecord],
    age: Option<i32>,
    policy: &RecommendationPolicy,
) -> Vec<RecommendedActivity> {
    let mut eligible: Vec<&Activity> = catalog.iter().filter(|a| a.suits_age(age)).collect();
    eligible.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    // Best recent score per activity.
    let mut best_scores: HashMap<Uuid, f64> = HashMap::new();
    for record in history {
        best_scores
            .entry(record.game_id)
            .and_modify(|best| *best = best.max(record.score))
            .or_insert(record.score);
    }

    // Average recent score per subject, over activities that are in the catalog.
    let mut subject_scores: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for activity in &eligible {
        if let Some(score) = best_scores.get(&activity.id) {
            let entry = subject_scores.entry(activity.subject.as_str()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }
    let weak_subjects: HashSet<&str> = subject_scores
        .iter()
        .filter(|(_, (sum, count))| sum / (*count as f64) < policy.review_score_threshold)
        .map(|(subject, _)| *subject)
        .collect();

    let mut picked: Vec<RecommendedActivity> = Vec::new();
    let mut taken: HashSet<Uuid> = HashSet::new();
    let mut push = |activity: &Activity, reason: RecommendationReason, picked: &mut Vec<RecommendedActivity>| {
        if picked.len() < policy.max_items && taken.insert(activity.id) {
            picked.push(RecommendedActivity {
                game_id: activity.id,
                title: activity.title.clone(),
                subject: activity.subject.clone(),
                reason,
            });
        }
    };

    let mut review: Vec<(&Activity, f64)> = eligible
        .iter()
        .filter_map(|a| best_scores.get(&a.id).map(|score| (*a, *score)))
        .filter(|(_, score)| *score < policy.review_score_threshold)
        .collect();
    review.sort_by(|(a, sa), (b, sb)| sa.total_cmp(sb).then(a.id.cmp(&b.id)));
    for (activity, _) in review.into_iter().take(policy.max_review_items) {
        push(activity, RecommendationReason::ReviewMissed, &mut picked);
    }

    let unplayed: Vec<&Activity> = eligible
        .iter()
        .copied()
        .filter(|a| !best_scores.contains_key(&a.id))
        .collect();

    for activity in unplayed
        .iter()
        .filter(|a| weak_subjects.contains(a.subject.as_str()))
        .take(policy.max_weak_subject_items)
    {
        push(*activity, RecommendationReason::WeakSubject, &mut picked);
    }

    let mut newest = unplayed.clone();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    for activity in newest {
        push(activity, RecommendationReason::NewContent, &mut picked);
    }

    for activity in eligible.iter().copied() {
        push(activity, RecommendationReason::AgeAppropriate, &mut picked);
    }

    picked
}

/// One entry per completed game, in order of first completion.
fn summarize_completions(
    records: &[ActivityRecord],
    game_ids: &[Uuid],
) -> Vec<RecommendedCourseResult> {
    let wanted: HashSet<&Uuid> = game_ids.iter().collect();
    let mut by_game: HashMap<Uuid, RecommendedCourseResult> = HashMap::new();

    for record in records {
        let Some(completed_on) = record.completed_on else {
            continue;
        };
        if !wanted.contains(&record.game_id) {
            continue;
        }
        by_game
            .entry(record.game_id)
            .and_modify(|result| {
                result.completed_on = result.completed_on.min(completed_on);
                result.stars = result.stars.max(record.stars);
                result.score = result.score.max(record.score);
                result.attempts += 1;
            })
            .or_insert(RecommendedCourseResult {
                game_id: record.game_id,
                completed_on,
                stars: record.stars,
                score: record.score,
                attempts: 1,
            });
    }

    let mut results: Vec<RecommendedCourseResult> = by_game.into_values().collect();
    results.sort_by(|a, b| a.completed_on.cmp(&b.completed_on).then(a.game_id.cmp(&b.game_id)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn activity(title: &str, subject: &str, created_day: u32) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            title: title.to_string(),
            subject: subject.to_string(),
            min_age: None,
            max_age: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, created_day, 0, 0, 0).unwrap(),
        }
    }

    fn played(game_id: Uuid, score: f64) -> ActivityRecord {
        let started = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        ActivityRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::nil(),
            game_id,
            started_on: started,
            completed_on: Some(started + Duration::minutes(10)),
            stars: 1,
            score,
        }
    }

    #[test]
    fn age_counts_full_years() {
        let dob = NaiveDate::from_ymd_opt(2016, 5, 20).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 5, 19).unwrap()), Some(9));
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()), Some(10));
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()), None);
    }

    #[test]
    fn review_comes_first_then_weak_subject_then_new() {
        let fractions = activity("Fractions", "math", 1);
        let decimals = activity("Decimals", "math", 2);
        let verbs = activity("Verbs", "english", 3);
        let nouns = activity("Nouns", "english", 4);
        let catalog = vec![fractions.clone(), decimals.clone(), verbs.clone(), nouns.clone()];
        let history = vec![played(fractions.id, 30.0), played(verbs.id, 95.0)];

        let items = select_activities(&catalog, &history, None, &RecommendationPolicy::default());

        assert_eq!(items[0].game_id, fractions.id);
        assert_eq!(items[0].reason, RecommendationReason::ReviewMissed);
        assert_eq!(items[1].game_id, decimals.id);
        assert_eq!(items[1].reason, RecommendationReason::WeakSubject);
        assert_eq!(items[2].game_id, nouns.id);
        assert_eq!(items[2].reason, RecommendationReason::NewContent);
        assert_eq!(items[3].game_id, verbs.id);
        assert_eq!(items[3].reason, RecommendationReason::AgeAppropriate);
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn age_filter_and_item_cap() {
        let mut too_old = activity("Algebra", "math", 1);
        too_old.min_age = Some(12);
        let catalog: Vec<Activity> = (1..=8)
            .map(|day| activity(&format!("Story {day}"), "reading", day))
            .chain(std::iter::once(too_old.clone()))
            .collect();
        let policy = RecommendationPolicy {
            max_items: 3,
            ..RecommendationPolicy::default()
        };

        let items = select_activities(&catalog, &[], Some(8), &policy);

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.game_id != too_old.id));
        assert_eq!(items[0].title, "Story 8");
    }

    #[test]
    fn completions_are_grouped_per_game() {
        let game = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut first = played(game, 50.0);
        first.stars = 1;
        let mut second = played(game, 90.0);
        second.stars = 3;
        second.completed_on = second.completed_on.map(|t| t + Duration::hours(1));
        let mut unfinished = played(game, 0.0);
        unfinished.completed_on = None;
        let foreign = played(other, 100.0);

        let results = summarize_completions(&[second, first.clone(), unfinished, foreign], &[game]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].attempts, 2);
        assert_eq!(results[0].stars, 3);
        assert_eq!(results[0].score, 90.0);
        assert_eq!(Some(results[0].completed_on), first.completed_on);
    }
}
