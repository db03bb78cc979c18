//! Timeline assembly: deduplicate, order and link extracted events.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Duration;
use layered_timeline::{
    normalize_description, DomainRules, EventId, EventType, Timeline, TimelineEvent,
};
use serde::{Deserialize, Serialize};

/// Tunable knobs for timeline assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// How many chronologically preceding dated events are checked for a causal pair
    pub causal_lookback: usize,
    /// Dated events at most this many hours apart are linked as concurrent
    pub concurrency_window_hours: i64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            causal_lookback: 3,
            concurrency_window_hours: 24,
        }
    }
}

impl AssemblerConfig {
    pub fn with_causal_lookback(mut self, lookback: usize) -> Self {
        self.causal_lookback = lookback;
        self
    }

    pub fn with_concurrency_window_hours(mut self, hours: i64) -> Self {
        self.concurrency_window_hours = hours;
        self
    }
}

/// Builds a [`Timeline`] from extracted events.
#[derive(Debug, Clone, Default)]
pub struct TimelineAssembler {
    config: AssemblerConfig,
    rules: DomainRules,
}

impl TimelineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn rules(&self) -> &DomainRules {
        &self.rules
    }

    /// Deduplicate, sort chronologically (undated last), add naive causal and
    /// concurrency links, then derive summary data.
    pub fn assemble(&self, events: Vec<TimelineEvent>) -> Timeline {
        let received = events.len();
        let mut events = deduplicate(events);
        events.sort_by(chronological);

        let ids: Vec<EventId> = events.iter().map(|e| e.id.clone()).collect();
        let (causal, concurrent) = self.links(&events);

        for &(cause, effect) in &causal {
            events[effect].caused_by.insert(ids[cause].clone());
            events[cause].leads_to.insert(ids[effect].clone());
        }
        for &(a, b) in &concurrent {
            events[a].concurrent_with.insert(ids[b].clone());
            events[b].concurrent_with.insert(ids[a].clone());
        }

        tracing::debug!(
            received,
            kept = events.len(),
            causal_links = causal.len(),
            concurrent_links = concurrent.len(),
            "assembled timeline"
        );
        Timeline::from_events(events, &self.rules)
    }

    /// Causal `(cause, effect)` and concurrent `(earlier, later)` index pairs
    /// over chronologically sorted events.
    fn links(&self, events: &[TimelineEvent]) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
        let dated: Vec<(usize, chrono::NaiveDateTime, EventType)> = events
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.sort_date().map(|d| (idx, d, e.event_type)))
            .collect();
        let window = Duration::hours(self.config.concurrency_window_hours);

        let mut causal = Vec::new();
        let mut concurrent = Vec::new();
        for (pos, &(idx, date, event_type)) in dated.iter().enumerate() {
            let lookback_start = pos.saturating_sub(self.config.causal_lookback);
            for &(prior_idx, _, prior_type) in dated[lookback_start..pos].iter().rev() {
                if self.rules.is_causal_pair(prior_type, event_type) {
                    tracing::trace!(cause = prior_idx, effect = idx, "naive causal link");
                    causal.push((prior_idx, idx));
                }
            }
            for &(later_idx, later_date, _) in &dated[pos + 1..] {
                if later_date - date > window {
                    break;
                }
                concurrent.push((idx, later_idx));
            }
        }
        (causal, concurrent)
    }
}

/// Keep the first event for each (description, date, type) key and each id.
fn deduplicate(events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    let mut seen_keys = HashSet::new();
    let mut seen_ids = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            let key = (
                normalize_description(&event.description),
                event
                    .date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                event.event_type,
            );
            let fresh = seen_ids.insert(event.id.clone()) && seen_keys.insert(key);
            if !fresh {
                tracing::trace!(id = %event.id, "dropping duplicate event");
            }
            fresh
        })
        .collect()
}

/// Order by `date ?? dateRange.start`, undated events last.
fn chronological(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    match (a.sort_date(), b.sort_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
