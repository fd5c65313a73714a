pub mod extract;
pub mod fetch;
pub mod mapper;
pub mod resolve;
pub mod week;

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::{RawPost, ResolvedGroupMetadata, WeekRange, WeekSchedule};
use crate::timezone::EventTimezone;
use crate::vk::VkError;

/// Read access to the social network the events are announced on.
pub trait SocialNetwork {
    /// Wall posts of `owner_id`; communities use negative owner ids.
    fn get_posts(&self, owner_id: i64, count: u32) -> Result<Vec<RawPost>, VkError>;
    fn get_groups_by_id(
        &self,
        ids: &[String],
        fields: &[&str],
    ) -> Result<Vec<ResolvedGroupMetadata>, VkError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub community_id: i64,
    pub post_count: u32,
    pub timezone: EventTimezone,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            community_id: config.settings.community_id,
            post_count: config.settings.post_count,
            timezone: config.timezone,
        }
    }
}

/// One fetch cycle: posts, mentions, batch lookup, mapping, then the filter
/// for `range` (see [`week::current_week`]).
///
/// Records that fail to map are logged and skipped; any upstream failure
/// aborts the cycle.
pub fn build_week_schedule<N>(
    network: &N,
    options: &PipelineOptions,
    range: WeekRange,
) -> Result<WeekSchedule, PipelineError>
where
    N: SocialNetwork + ?Sized,
{
    let posts = fetch::fetch_posts(network, options.community_id, options.post_count)?;
    let references = extract::extract_group_references(posts.iter().map(|post| post.text.as_str()));
    tracing::info!(
        community_id = options.community_id,
        posts = posts.len(),
        references = references.len(),
        "scanned wall"
    );

    let records = resolve::resolve_events(network, &references)?;
    let (events, failures) = mapper::map_events(&records, options.timezone);
    for failure in &failures {
        tracing::warn!(error = %failure, "skipping event record");
    }

    let events = week::filter_events_for_week(events, &range);
    for event in &events {
        tracing::debug!("week event\n{event}");
    }
    tracing::info!(
        start = %range.start,
        end = %range.end,
        events = events.len(),
        skipped = failures.len(),
        "week schedule ready"
    );

    Ok(WeekSchedule { range, events })
}


#[cfg(test)]
mod tests {
    use super::testing::FakeNetwork;
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn options() -> PipelineOptions {
        PipelineOptions {
            community_id: 87677042,
            post_count: 20,
            timezone: EventTimezone::Named(chrono_tz::UTC),
        }
    }

    fn group(value: serde_json::Value) -> ResolvedGroupMetadata {
        serde_json::from_value(value).expect("group fixture")
    }

    fn week_of(s: &str) -> WeekRange {
        week::week_bounds(NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date fixture"))
    }

    #[test]
    fn builds_schedule_for_current_week() {
        let network = FakeNetwork {
            posts: vec![
                RawPost::new("Check [club555|Cool Event] this weekend"),
                RawPost::new("Again [club555|Cool Event] and [club556|Some Page]"),
                RawPost::new("Later: [club557|Next Week]"),
            ],
            groups: vec![
                // 2023-11-14T22:13:20Z, a Tuesday
                group(json!({"id": 555, "name": "Cool Event", "screen_name": "cool", "type": "event", "start_date": 1700000000})),
                group(json!({"id": 556, "name": "Some Page", "screen_name": "page", "type": "page"})),
                // 2023-11-21
                group(json!({"id": 557, "name": "Next Week", "screen_name": "next", "type": "event", "start_date": 1700604800})),
            ],
            ..Default::default()
        };

        let schedule =
            build_week_schedule(&network, &options(), week_of("2023-11-16")).expect("schedule");

        assert_eq!(schedule.range.start, "2023-11-13");
        assert_eq!(schedule.range.end, "2023-11-19");
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].event_id, 555);
        assert_eq!(schedule.events[0].url, "https://vk.com/cool");
        assert_eq!(schedule.events[0].date, "2023-11-14");

        assert_eq!(*network.post_calls.borrow(), vec![(-87677042, 20)]);
        let group_calls = network.group_calls.borrow();
        assert_eq!(group_calls.len(), 1, "lookup is a single batch call");
        assert_eq!(group_calls[0], vec!["555", "556", "557"]);
    }

    #[test]
    fn no_mentions_skips_lookup_and_yields_nothing() {
        let network = FakeNetwork {
            posts: vec![RawPost::new("Nothing to see here"), RawPost::default()],
            ..Default::default()
        };
        let schedule =
            build_week_schedule(&network, &options(), week_of("2024-01-03")).expect("schedule");
        assert!(schedule.events.is_empty());
        assert!(network.group_calls.borrow().is_empty());
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let network = FakeNetwork {
            posts: vec![RawPost::new("[club1|a] [club2|b]")],
            groups: vec![
                group(json!({"id": 1, "name": "Broken", "screen_name": "broken", "type": "event"})),
                group(json!({"id": 2, "name": "Fine", "screen_name": "fine", "type": "event", "start_date": 1700000000})),
            ],
            ..Default::default()
        };
        let schedule =
            build_week_schedule(&network, &options(), week_of("2023-11-14")).expect("schedule");
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].name, "Fine");
    }

    #[test]
    fn fetch_failure_aborts_cycle() {
        let network = FakeNetwork {
            fail_posts: true,
            ..Default::default()
        };
        let err = build_week_schedule(&network, &options(), week_of("2024-01-03")).unwrap_err();
        assert!(matches!(err, PipelineError::FetchFailed(_)));
        assert!(network.group_calls.borrow().is_empty());
    }

    #[test]
    fn lookup_failure_aborts_cycle() {
        let network = FakeNetwork {
            posts: vec![RawPost::new("[club555|Cool Event]")],
            fail_groups: true,
            ..Default::default()
        };
        let err = build_week_schedule(&network, &options(), week_of("2024-01-03")).unwrap_err();
        assert!(matches!(err, PipelineError::ResolutionFailed(_)));
    }
}
