use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Event, WeekRange};
use crate::timezone::EventTimezone;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Monday through Sunday of the week containing `today`.
pub fn week_bounds(today: NaiveDate) -> WeekRange {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let sunday = monday + Duration::days(6);
    WeekRange::new(
        monday.format(DATE_FORMAT).to_string(),
        sunday.format(DATE_FORMAT).to_string(),
    )
}

pub fn current_week(timezone: EventTimezone) -> WeekRange {
    week_bounds(timezone.today())
}

/// Keeps the events dated inside `range`, both ends included.
pub fn filter_events_for_week(events: Vec<Event>, range: &WeekRange) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| range.contains(&event.date))
        .collect()
}
