use serde_json::Value;

use crate::error::PipelineError;
use crate::models::{Event, ResolvedGroupMetadata};
use crate::timezone::EventTimezone;

pub const EVENT_URL_PREFIX: &str = "https://vk.com/";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn event_url(screen_name: &str) -> String {
    format!("{EVENT_URL_PREFIX}{screen_name}")
}

/// Builds the canonical event from one `type == "event"` record.
pub fn map_event(
    record: &ResolvedGroupMetadata,
    timezone: EventTimezone,
) -> Result<Event, PipelineError> {
    let malformed = |reason: &str| PipelineError::MalformedEventRecord {
        id: record.id,
        reason: reason.to_string(),
    };

    let seconds = match &record.start_date {
        None | Some(Value::Null) => return Err(malformed("start_date is missing")),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| malformed("start_date is not an integer timestamp"))?,
    };
    let date = timezone
        .date_of_timestamp(seconds)
        .ok_or_else(|| malformed("start_date is out of range"))?;

    Ok(Event {
        event_id: record.id,
        name: record.name.clone(),
        screen_name: record.screen_name.clone(),
        url: event_url(&record.screen_name),
        description: record.description.clone(),
        date: date.format(DATE_FORMAT).to_string(),
        image_url: record.photo_200.clone(),
    })
}

/// Maps every record, returning the events and the per-record failures.
pub fn map_events(
    records: &[ResolvedGroupMetadata],
    timezone: EventTimezone,
) -> (Vec<Event>, Vec<PipelineError>) {
    let mut events = Vec::with_capacity(records.len());
    let mut failures = Vec::new();
    for record in records {
        match map_event(record, timezone) {
            Ok(event) => events.push(event),
            Err(err) => failures.push(err),
        }
    }
    (events, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use serde_json::json;

    fn record(value: serde_json::Value) -> ResolvedGroupMetadata {
        serde_json::from_value(value).expect("record fixture")
    }

    fn utc() -> EventTimezone {
        EventTimezone::Named(chrono_tz::UTC)
    }

    #[test]
    fn maps_all_fields() {
        let source = record(json!({
            "id": 555,
            "name": "Cool Event",
            "screen_name": "cool",
            "type": "event",
            "photo_200": "https://sun9-1.userapi.com/cool.jpg",
            "description": "Bring friends",
            "start_date": 1700000000
        }));
        let event = map_event(&source, utc()).expect("event");
        assert_eq!(event.event_id, 555);
        assert_eq!(event.name, "Cool Event");
        assert_eq!(event.screen_name, "cool");
        assert_eq!(event.url, "https://vk.com/cool");
        assert_eq!(event.description, "Bring friends");
        assert_eq!(event.date, "2023-11-14");
        assert_eq!(
            event.image_url.as_deref(),
            Some("https://sun9-1.userapi.com/cool.jpg")
        );
    }

    #[test]
    fn absent_photo_stays_absent() {
        let source = record(json!({"id": 1, "screen_name": "x", "type": "event", "start_date": 0}));
        let event = map_event(&source, utc()).expect("event");
        assert_eq!(event.image_url, None);
        assert_eq!(event.date, "1970-01-01");
    }

    #[test]
    fn zero_pads_month_and_day() {
        // 2024-01-05T12:00:00Z
        let source = record(json!({"id": 1, "screen_name": "x", "type": "event", "start_date": 1704456000}));
        assert_eq!(map_event(&source, utc()).expect("event").date, "2024-01-05");
    }

    #[test]
    fn mapping_is_deterministic() {
        let source = record(json!({"id": 9, "screen_name": "same", "type": "event", "start_date": 1700000000}));
        let zone = EventTimezone::Named(chrono_tz::Asia::Novosibirsk);
        let first = map_event(&source, zone).expect("first");
        let second = map_event(&source, zone).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_or_malformed_start_date_is_rejected() {
        for start in [json!(null), json!("1700000000"), json!(1.5), json!(i64::MAX)] {
            let source = record(json!({"id": 3, "type": "event", "start_date": start}));
            let err = map_event(&source, utc()).unwrap_err();
            assert!(
                matches!(err, PipelineError::MalformedEventRecord { id: 3, .. }),
                "start_date {start} should be rejected"
            );
        }
        let source = record(json!({"id": 4, "type": "event"}));
        assert!(map_event(&source, utc()).is_err());
    }

    #[test]
    fn batch_collects_failures_and_keeps_going() {
        let records = vec![
            record(json!({"id": 1, "type": "event"})),
            record(json!({"id": 2, "screen_name": "ok", "type": "event", "start_date": 1700000000})),
            record(json!({"id": 3, "type": "event", "start_date": "tomorrow"})),
        ];
        let (events, failures) = map_events(&records, utc());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, 2);
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn date_stays_within_a_day_of_utc_in_any_zone() {
        let zones = [
            chrono_tz::Pacific::Kiritimati,
            chrono_tz::Pacific::Pago_Pago,
            chrono_tz::Asia::Kolkata,
            chrono_tz::America::St_Johns,
            chrono_tz::Europe::Moscow,
            chrono_tz::UTC,
        ];
        let timestamps = [0_i64, 1_700_000_000, 1_704_067_199, 1_704_067_200, 951_782_400];
        for ts in timestamps {
            let utc_date = DateTime::<Utc>::from_timestamp(ts, 0)
                .expect("timestamp in range")
                .date_naive();
            for zone in zones {
                let source = record(json!({"id": 1, "screen_name": "x", "type": "event", "start_date": ts}));
                let event = map_event(&source, EventTimezone::Named(zone)).expect("event");
                let mapped = NaiveDate::parse_from_str(&event.date, "%Y-%m-%d").expect("iso date");
                assert!(
                    mapped >= utc_date - Duration::days(1) && mapped <= utc_date + Duration::days(1),
                    "{ts} in {zone:?} mapped to {mapped}"
                );
            }
        }
    }
}
