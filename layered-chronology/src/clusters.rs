//! Event clustering.
//!
//! Three independent generators each emit clusters of at least
//! `min_cluster_size` events:
//!
//! - **Temporal**: dated events inside one cluster window
//! - **Event type**: all events of one type
//! - **Participant**: all events naming one participant

use std::collections::BTreeMap;

use chrono::Duration;
use layered_timeline::{EventId, Timeline, TimelineEvent};

use crate::analyzer::{dated_in_order, ChronologyAnalyzer};
use crate::insights::{ClusterKind, EventCluster};
use crate::patterns::{group_by_type, span, windowed};

const SAME_TYPE_WEIGHT: f64 = 0.3;
const SHARED_PARTICIPANT_WEIGHT: f64 = 0.2;
const CAUSAL_LINK_WEIGHT: f64 = 0.4;
const IMPORTANT_TYPE_BONUS: f64 = 0.5;

impl ChronologyAnalyzer {
    pub fn cluster_events(&self, timeline: &Timeline) -> Vec<EventCluster> {
        let min_size = self.config.min_cluster_size;
        let mut clusters = Vec::new();

        let window = Duration::days(self.config.cluster_window_days);
        for (n, group) in windowed(&dated_in_order(timeline), window, min_size)
            .into_iter()
            .enumerate()
        {
            clusters.push(self.cluster(
                format!("temporal_{}", n + 1),
                ClusterKind::Temporal,
                format!(
                    "{} events within {} days",
                    group.len(),
                    self.config.cluster_window_days
                ),
                &group,
            ));
        }

        let all: Vec<&TimelineEvent> = timeline.events.iter().collect();
        for (event_type, group) in group_by_type(&all) {
            if group.len() >= min_size {
                clusters.push(self.cluster(
                    format!("type_{}", event_type),
                    ClusterKind::EventType,
                    format!("{} {} events", group.len(), event_type),
                    &group,
                ));
            }
        }

        let mut by_participant: BTreeMap<&str, Vec<&TimelineEvent>> = BTreeMap::new();
        for event in &timeline.events {
            for participant in &event.participants {
                by_participant
                    .entry(participant.as_str())
                    .or_default()
                    .push(event);
            }
        }
        for (participant, group) in by_participant {
            if group.len() >= min_size {
                clusters.push(self.cluster(
                    format!("participant_{}", participant),
                    ClusterKind::Participant,
                    format!("{} events involving {}", group.len(), participant),
                    &group,
                ));
            }
        }

        tracing::debug!(clusters = clusters.len(), "events clustered");
        clusters
    }

    fn cluster(
        &self,
        name: String,
        kind: ClusterKind,
        description: String,
        events: &[&TimelineEvent],
    ) -> EventCluster {
        EventCluster {
            name,
            kind,
            event_ids: events.iter().map(|e| e.id.clone()).collect(),
            central_event_id: self.central_event(events),
            coherence: coherence(events),
            date_range: span(events),
            description,
        }
    }

    /// The event maximizing confidence + connection count + important-type
    /// bonus. The first event wins ties.
    pub(crate) fn central_event(&self, events: &[&TimelineEvent]) -> Option<EventId> {
        let mut best: Option<(&TimelineEvent, f64)> = None;
        for &event in events {
            let mut score = event.confidence + event.connection_count() as f64;
            if self.rules.is_important(event.event_type) {
                score += IMPORTANT_TYPE_BONUS;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((event, score));
            }
        }
        best.map(|(event, _)| event.id.clone())
    }
}

/// Mean pairwise relatedness, clamped to 1.
pub(crate) fn coherence(events: &[&TimelineEvent]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            pairs += 1;
            if a.event_type == b.event_type {
                total += SAME_TYPE_WEIGHT;
            }
            total += SHARED_PARTICIPANT_WEIGHT * a.shared_participants(b) as f64;
            if a.is_causally_linked(b) {
                total += CAUSAL_LINK_WEIGHT;
            }
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    (total / pairs as f64).min(1.0)
}
