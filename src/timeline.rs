//! The assembled, chronologically ordered timeline.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::event::{EventCertainty, EventId, EventType, TimelineEvent};
use crate::rules::DomainRules;
use crate::temporal::DateRange;
use crate::TimelineError;

/// Minimum confidence for an event to count as a key event regardless of type.
const KEY_EVENT_CONFIDENCE: f64 = 0.8;

/// Counts recomputed from the final event list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStatistics {
    pub total_events: usize,
    pub dated_events: usize,
    pub undated_events: usize,
    pub events_by_type: BTreeMap<EventType, usize>,
    pub events_by_certainty: BTreeMap<EventCertainty, usize>,
    pub causal_links: usize,
    pub concurrent_links: usize,
}

impl TimelineStatistics {
    pub fn compute(events: &[TimelineEvent]) -> Self {
        let mut stats = TimelineStatistics {
            total_events: events.len(),
            ..Default::default()
        };
        for event in events {
            if event.is_dated() {
                stats.dated_events += 1;
            } else {
                stats.undated_events += 1;
            }
            *stats.events_by_type.entry(event.event_type).or_insert(0) += 1;
            *stats.events_by_certainty.entry(event.certainty).or_insert(0) += 1;
            stats.causal_links += event.caused_by.len();
            stats.concurrent_links += event.concurrent_with.len();
        }
        // each concurrency link is stored on both ends
        stats.concurrent_links /= 2;
        stats
    }
}

/// An ordered chronology of events plus derived summary data.
///
/// Events are sorted by `date ?? dateRange.start`, with undated events last
/// in their original order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    pub confidence_score: f64,
    #[serde(default)]
    pub event_types: BTreeSet<EventType>,
    #[serde(default)]
    pub participants: BTreeSet<String>,
    #[serde(default)]
    pub source_documents: BTreeSet<String>,
    #[serde(default)]
    pub key_event_ids: Vec<EventId>,
    #[serde(default)]
    pub event_clusters: BTreeMap<String, Vec<EventId>>,
    #[serde(default)]
    pub causal_chains: Vec<Vec<EventId>>,
    #[serde(default)]
    pub statistics: TimelineStatistics,
}

impl Timeline {
    /// Build a timeline from events that are already deduplicated, sorted and linked.
    pub fn from_events(events: Vec<TimelineEvent>, rules: &DomainRules) -> Self {
        let mut earliest: Option<NaiveDateTime> = None;
        let mut latest: Option<NaiveDateTime> = None;
        let mut event_types = BTreeSet::new();
        let mut participants = BTreeSet::new();
        let mut source_documents = BTreeSet::new();
        let mut key_event_ids = Vec::new();
        let mut by_type: BTreeMap<EventType, Vec<EventId>> = BTreeMap::new();

        for event in &events {
            if let Some(start) = event.sort_date() {
                earliest = Some(earliest.map_or(start, |e| e.min(start)));
            }
            if let Some(end) = event.end_date() {
                latest = Some(latest.map_or(end, |l| l.max(end)));
            }
            event_types.insert(event.event_type);
            participants.extend(event.participants.iter().cloned());
            if let Some(doc) = &event.source.document_id {
                source_documents.insert(doc.clone());
            }
            if rules.is_important(event.event_type) || event.confidence >= KEY_EVENT_CONFIDENCE {
                key_event_ids.push(event.id.clone());
            }
            by_type
                .entry(event.event_type)
                .or_default()
                .push(event.id.clone());
        }

        let confidence_score = if events.is_empty() {
            0.0
        } else {
            events.iter().map(|e| e.confidence).sum::<f64>() / events.len() as f64
        };

        let event_clusters = by_type
            .into_iter()
            .filter(|(_, ids)| ids.len() >= 2)
            .map(|(event_type, ids)| (format!("type:{}", event_type), ids))
            .collect();

        let causal_chains = causal_chains(&events);
        let statistics = TimelineStatistics::compute(&events);

        Self {
            events,
            date_range: earliest.zip(latest).map(|(s, e)| DateRange::new(s, e)),
            confidence_score,
            event_types,
            participants,
            source_documents,
            key_event_ids,
            event_clusters,
            causal_chains,
            statistics,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event(&self, id: &EventId) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Index of an event in chronological order.
    pub fn position(&self, id: &EventId) -> Option<usize> {
        self.events.iter().position(|e| &e.id == id)
    }

    /// Map from id to chronological index.
    pub fn index(&self) -> HashMap<&EventId, usize> {
        self.events
            .iter()
            .enumerate()
            .map(|(idx, event)| (&event.id, idx))
            .collect()
    }

    /// Dated events in chronological order.
    pub fn dated_events(&self) -> Vec<&TimelineEvent> {
        self.events.iter().filter(|e| e.is_dated()).collect()
    }

    pub fn undated_events(&self) -> Vec<&TimelineEvent> {
        self.events.iter().filter(|e| !e.is_dated()).collect()
    }

    /// Events whose sort date lies in `from..=to`.
    pub fn events_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<&TimelineEvent> {
        self.events
            .iter()
            .filter(|e| e.sort_date().map_or(false, |d| from <= d && d <= to))
            .collect()
    }

    pub fn events_with_participant(&self, participant: &str) -> Vec<&TimelineEvent> {
        self.events
            .iter()
            .filter(|e| e.participants.iter().any(|p| p == participant))
            .collect()
    }

    pub fn events_of_type(&self, event_type: EventType) -> Vec<&TimelineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Check structural invariants of (typically imported) timelines.
    pub fn validate(&self) -> Result<(), TimelineError> {
        let checked = self.check_invariants();
        if let Err(error) = &checked {
            tracing::debug!(%error, events = self.events.len(), "timeline failed validation");
        }
        checked
    }

    fn check_invariants(&self) -> Result<(), TimelineError> {
        let mut ids = HashSet::new();
        for event in &self.events {
            if !ids.insert(&event.id) {
                return Err(TimelineError::DuplicateId(event.id.to_string()));
            }
            event.check_dates()?;
        }

        for event in &self.events {
            let linked = event
                .caused_by
                .iter()
                .chain(&event.leads_to)
                .chain(&event.concurrent_with);
            for target in linked {
                if !ids.contains(target) {
                    return Err(TimelineError::DanglingReference {
                        event_id: event.id.to_string(),
                        missing: target.to_string(),
                    });
                }
            }
        }

        let mut previous: Option<NaiveDateTime> = None;
        let mut seen_undated = false;
        for event in &self.events {
            match event.sort_date() {
                Some(date) => {
                    if seen_undated || previous.map_or(false, |p| date < p) {
                        return Err(TimelineError::OutOfOrder(event.id.to_string()));
                    }
                    previous = Some(date);
                }
                None => seen_undated = true,
            }
        }

        Ok(())
    }
}

/// Maximal `leadsTo` walks starting from events that have no cause.
fn causal_chains(events: &[TimelineEvent]) -> Vec<Vec<EventId>> {
    let lookup: HashMap<&EventId, &TimelineEvent> = events.iter().map(|e| (&e.id, e)).collect();
    let mut chains = Vec::new();

    for root in events.iter().filter(|e| e.caused_by.is_empty() && !e.leads_to.is_empty()) {
        let mut chain = vec![root.id.clone()];
        let mut visited: HashSet<&EventId> = HashSet::new();
        visited.insert(&root.id);
        let mut current = root;
        // follow the earliest unvisited effect (ids sort chronologically within a document)
        while let Some(next) = current
            .leads_to
            .iter()
            .filter(|id| !visited.contains(id))
            .filter_map(|id| lookup.get(id).copied())
            .min_by_key(|e| e.sort_date())
        {
            visited.insert(&next.id);
            chain.push(next.id.clone());
            current = next;
        }
        if chain.len() >= 2 {
            chains.push(chain);
        }
    }

    chains
}
