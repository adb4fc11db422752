pub mod goals;
pub mod recommendations;

pub use goals::GoalTracker;
pub use recommendations::RecommendationEngine;

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// `[day 00:00, next day 00:00)` in UTC.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}
