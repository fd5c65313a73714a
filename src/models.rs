use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One wall post. Only the body text matters to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub text: String,
}

impl RawPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Numeric community id captured from a `[club<digits>|` mention.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupReference(String);

impl GroupReference {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const EVENT_GROUP_TYPE: &str = "event";

/// A community record as returned by `groups.getById`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGroupMetadata {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(rename = "type", default)]
    pub group_type: String,
    #[serde(default)]
    pub photo_200: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Kept raw so one malformed record cannot fail decoding of the whole batch.
    #[serde(default)]
    pub start_date: Option<Value>,
}

impl ResolvedGroupMetadata {
    pub fn is_event(&self) -> bool {
        self.group_type == EVENT_GROUP_TYPE
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    pub screen_name: String,
    pub url: String,
    pub description: String,
    pub date: String, // YYYY-MM-DD in the configured timezone
    pub image_url: Option<String>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event ID: {}", self.event_id)?;
        writeln!(f, "Event Name: {}", self.name)?;
        writeln!(f, "Event Screen Name: {}", self.screen_name)?;
        writeln!(f, "Event URL: {}", self.url)?;
        writeln!(f, "Event Description: {}", self.description)?;
        writeln!(f, "Event Date: {}", self.date)?;
        write!(
            f,
            "Event Image URL: {}",
            self.image_url.as_deref().unwrap_or("none")
        )
    }
}

/// Inclusive `[start, end]` range of `YYYY-MM-DD` dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: String,
    pub end: String,
}

impl WeekRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

/// Read-only snapshot served by the bot until the next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSchedule {
    pub range: WeekRange,
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_group_record_with_missing_optional_fields() {
        let record: ResolvedGroupMetadata =
            serde_json::from_value(json!({ "id": 556, "name": "Page", "type": "page" }))
                .expect("decode record");
        assert_eq!(record.id, 556);
        assert!(!record.is_event());
        assert_eq!(record.photo_200, None);
        assert_eq!(record.start_date, None);
        assert!(record.description.is_empty());
    }

    #[test]
    fn malformed_start_date_still_decodes() {
        let record: ResolvedGroupMetadata = serde_json::from_value(json!({
            "id": 1, "type": "event", "screen_name": "x", "start_date": "soon"
        }))
        .expect("decode record");
        assert!(record.is_event());
        assert_eq!(record.start_date, Some(json!("soon")));
    }

    #[test]
    fn week_range_is_inclusive() {
        let range = WeekRange::new("2024-01-01", "2024-01-07");
        assert!(range.contains("2024-01-01"));
        assert!(range.contains("2024-01-07"));
        assert!(!range.contains("2023-12-31"));
        assert!(!range.contains("2024-01-08"));
    }

    #[test]
    fn display_lists_every_field() {
        let event = Event {
            event_id: 555,
            name: "Cool Event".into(),
            screen_name: "cool".into(),
            url: "https://vk.com/cool".into(),
            description: String::new(),
            date: "2023-11-14".into(),
            image_url: None,
        };
        let shown = event.to_string();
        assert!(shown.contains("Event ID: 555"));
        assert!(shown.contains("Event URL: https://vk.com/cool"));
        assert!(shown.ends_with("Event Image URL: none"));
    }
}
