use chrono::{Duration, NaiveDate, NaiveDateTime};
use layered_timeline::{DomainRules, EventId, EventType, Timeline, TimelineEvent};

/// Midnight, `n` days after 1 January 2024.
pub(super) fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(n)
}

pub(super) fn dated(id: &str, event_type: EventType, at: NaiveDateTime) -> TimelineEvent {
    TimelineEvent::new(EventId::new(id), event_type, format!("{} event", id)).with_date(at)
}

pub(super) fn undated(id: &str, event_type: EventType) -> TimelineEvent {
    TimelineEvent::new(EventId::new(id), event_type, format!("{} event", id))
}

/// Record `cause -> effect` on both events.
pub(super) fn link(events: &mut [TimelineEvent], cause: &str, effect: &str) {
    for event in events.iter_mut() {
        if event.id.as_str() == cause {
            event.leads_to.insert(EventId::new(effect));
        }
        if event.id.as_str() == effect {
            event.caused_by.insert(EventId::new(cause));
        }
    }
}

pub(super) fn timeline(events: Vec<TimelineEvent>) -> Timeline {
    Timeline::from_events(events, &DomainRules::default())
}

pub(super) fn ids(ids: &[EventId]) -> Vec<&str> {
    ids.iter().map(EventId::as_str).collect()
}
