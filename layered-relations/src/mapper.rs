//! Relationship mapping.
//!
//! [`RelationshipMapper::map`] unions event relationships from six sources:
//!
//! - **Direct links** recorded on events during assembly
//! - **Temporal proximity** between chronologically adjacent dated events
//! - **Procedural sequences** matched against the domain templates
//! - **Content similarity** of event descriptions (cosine over term counts)
//! - **Shared participants**
//! - **Chronology insights**: causal candidates, cluster membership and conflicts
//!
//! Relationships are deduplicated by `(source, target, kind)`, keeping the
//! highest confidence, and returned in a stable order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use layered_chronology::{ChronologyInsights, Severity};
use layered_timeline::{terms, DomainRules, EventId, Timeline, TimelineEvent};
use serde::{Deserialize, Serialize};

use crate::entities::{entity_relationships, PhraseClasses};
use crate::network::{
    central_entities, DetectionMethod, EntityRelationship, EventGraph, EventRelationship,
    MissingRelationship, MissingRelationshipKind, NetworkPattern, NetworkPatternKind,
    RelationshipKind, RelationshipNetwork, RelationshipStrength,
};
use crate::validation::{validate_relationships, ValidationReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub direct_causal_confidence: f64,
    pub concurrent_confidence: f64,
    /// Minimum cosine similarity for a content edge
    pub similarity_threshold: f64,
    pub moderate_similarity: f64,
    pub strong_similarity: f64,
    /// Minimum matched events before a template yields procedural edges
    pub min_sequence_events: usize,
    pub central_limit: usize,
    pub missing_limit: usize,
    /// Events at or above this confidence are expected to have relationships
    pub isolated_event_confidence: f64,
    /// Co-occurrences before an unexplained participant pair is reported
    pub entity_cooccurrence_threshold: usize,
    /// More causal edges than this form a complex causal network
    pub complex_causal_edges: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            direct_causal_confidence: 0.8,
            concurrent_confidence: 0.7,
            similarity_threshold: 0.3,
            moderate_similarity: 0.5,
            strong_similarity: 0.7,
            min_sequence_events: 3,
            central_limit: 5,
            missing_limit: 10,
            isolated_event_confidence: 0.8,
            entity_cooccurrence_threshold: 3,
            complex_causal_edges: 2,
        }
    }
}

impl MapperConfig {
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_missing_limit(mut self, limit: usize) -> Self {
        self.missing_limit = limit;
        self
    }
}

/// Builds a [`RelationshipNetwork`] from a timeline and, optionally, the
/// insights the chronology analyzer produced for it.
#[derive(Debug, Clone, Default)]
pub struct RelationshipMapper {
    config: MapperConfig,
    rules: DomainRules,
    phrases: PhraseClasses,
}

impl RelationshipMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn map(
        &self,
        timeline: &Timeline,
        insights: Option<&ChronologyInsights>,
    ) -> RelationshipNetwork {
        let _span = tracing::debug_span!("map_relationships", events = timeline.len()).entered();

        let event_relationships = self.event_relationships(timeline, insights);
        let entity_relationships = self.entity_relationships(timeline);

        let graph = EventGraph::new(timeline, &event_relationships);
        let metrics = graph.metrics();
        let central_events = graph
            .central_nodes(self.config.central_limit)
            .into_iter()
            .map(|idx| timeline.events[idx].id.clone())
            .collect();

        let patterns = self.network_patterns(timeline, &event_relationships);
        let potential_missing_relationships =
            self.missing_relationships(timeline, &event_relationships, &entity_relationships);
        let validation = self.validate(timeline, &event_relationships);

        tracing::debug!(
            relationships = event_relationships.len(),
            entity_pairs = entity_relationships.len(),
            density = metrics.density,
            findings = validation.len(),
            "relationship network mapped"
        );

        RelationshipNetwork {
            event_relationships,
            entity_relationships,
            metrics,
            central_events,
            central_entities: central_entities(timeline, self.config.central_limit),
            patterns,
            potential_missing_relationships,
            validation,
        }
    }

    /// Union of every relationship generator, deduplicated.
    pub fn event_relationships(
        &self,
        timeline: &Timeline,
        insights: Option<&ChronologyInsights>,
    ) -> Vec<EventRelationship> {
        let mut found = self.direct_relationships(timeline);
        found.extend(self.proximity_relationships(timeline));
        found.extend(self.procedural_relationships(timeline));
        found.extend(self.similarity_relationships(timeline));
        found.extend(self.participant_relationships(timeline));
        if let Some(insights) = insights {
            found.extend(self.insight_relationships(insights));
        }
        deduplicate(found)
    }

    pub fn entity_relationships(&self, timeline: &Timeline) -> Vec<EntityRelationship> {
        entity_relationships(timeline, &self.phrases)
    }

    pub fn validate(
        &self,
        timeline: &Timeline,
        relationships: &[EventRelationship],
    ) -> ValidationReport {
        validate_relationships(timeline, relationships)
    }

    // ========================================================================
    // Generators
    // ========================================================================

    fn direct_relationships(&self, timeline: &Timeline) -> Vec<EventRelationship> {
        let mut found = Vec::new();
        let causal = |source: &EventId, target: &EventId| {
            EventRelationship::new(
                source.clone(),
                target.clone(),
                RelationshipKind::Causal,
                self.config.direct_causal_confidence,
                DetectionMethod::DirectLink,
            )
            .with_time_gap(gap_days(timeline, source, target))
            .with_evidence("recorded causal link")
        };

        for event in &timeline.events {
            for cause in &event.caused_by {
                found.push(causal(cause, &event.id));
            }
            for effect in &event.leads_to {
                found.push(causal(&event.id, effect));
            }
            for other in &event.concurrent_with {
                let (source, target) = if event.id <= *other {
                    (&event.id, other)
                } else {
                    (other, &event.id)
                };
                found.push(
                    EventRelationship::new(
                        source.clone(),
                        target.clone(),
                        RelationshipKind::Concurrent,
                        self.config.concurrent_confidence,
                        DetectionMethod::DirectLink,
                    )
                    .with_time_gap(gap_days(timeline, source, target))
                    .with_evidence("recorded concurrency"),
                );
            }
        }
        found
    }

    fn proximity_relationships(&self, timeline: &Timeline) -> Vec<EventRelationship> {
        let dated = dated_in_order(timeline);
        let mut found = Vec::new();
        for pair in dated.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            let (Some(start), Some(end)) = (before.sort_date(), after.sort_date()) else {
                continue;
            };
            let gap = end - start;
            let (strength, confidence) = if gap <= Duration::days(1) {
                (RelationshipStrength::Definitive, 0.9)
            } else if gap <= Duration::days(7) {
                (RelationshipStrength::Strong, 0.7)
            } else if gap <= Duration::days(30) {
                (RelationshipStrength::Moderate, 0.5)
            } else {
                continue;
            };
            found.push(
                EventRelationship::new(
                    before.id.clone(),
                    after.id.clone(),
                    RelationshipKind::Temporal,
                    confidence,
                    DetectionMethod::TemporalProximity,
                )
                .with_strength(strength)
                .with_time_gap(Some(gap.num_days()))
                .with_evidence(format!("{} days apart", gap.num_days())),
            );
        }
        found
    }

    fn procedural_relationships(&self, timeline: &Timeline) -> Vec<EventRelationship> {
        let dated = dated_in_order(timeline);
        let mut found = Vec::new();
        for sequence in &self.rules.sequences {
            let matched = sequence.match_in_order(&dated);
            if matched.len() < self.config.min_sequence_events.max(2) {
                continue;
            }
            let completeness = matched.len() as f64 / sequence.steps.len() as f64;
            for (step, pair) in matched.windows(2).enumerate() {
                let (source, target) = (dated[pair[0]], dated[pair[1]]);
                let kind = if self.rules.is_outcome(target.event_type) {
                    RelationshipKind::Outcome
                } else if self
                    .rules
                    .is_prerequisite(source.event_type, target.event_type)
                {
                    RelationshipKind::Prerequisite
                } else {
                    RelationshipKind::Procedural
                };
                found.push(
                    EventRelationship::new(
                        source.id.clone(),
                        target.id.clone(),
                        kind,
                        0.5 + 0.3 * completeness,
                        DetectionMethod::ProceduralSequence,
                    )
                    .with_time_gap(gap_days(timeline, &source.id, &target.id))
                    .with_evidence(format!("{} step {}", sequence.name, step + 2)),
                );
            }
        }
        found
    }

    fn similarity_relationships(&self, timeline: &Timeline) -> Vec<EventRelationship> {
        let vectors: Vec<BTreeMap<String, f64>> = timeline
            .events
            .iter()
            .map(|e| term_vector(&e.description))
            .collect();
        let mut found = Vec::new();
        for (i, a) in timeline.events.iter().enumerate() {
            for (j, b) in timeline.events.iter().enumerate().skip(i + 1) {
                let similarity = cosine(&vectors[i], &vectors[j]);
                if similarity < self.config.similarity_threshold {
                    continue;
                }
                let strength = if similarity >= self.config.strong_similarity {
                    RelationshipStrength::Strong
                } else if similarity >= self.config.moderate_similarity {
                    RelationshipStrength::Moderate
                } else {
                    RelationshipStrength::Weak
                };
                found.push(
                    EventRelationship::new(
                        a.id.clone(),
                        b.id.clone(),
                        RelationshipKind::Supportive,
                        similarity,
                        DetectionMethod::ContentSimilarity,
                    )
                    .with_strength(strength)
                    .with_time_gap(gap_days(timeline, &a.id, &b.id))
                    .with_evidence(format!("description similarity {:.2}", similarity)),
                );
            }
        }
        found
    }

    fn participant_relationships(&self, timeline: &Timeline) -> Vec<EventRelationship> {
        let mut found = Vec::new();
        for (i, a) in timeline.events.iter().enumerate() {
            for b in &timeline.events[i + 1..] {
                let shared = a.shared_participants(b);
                let (strength, confidence) = match shared {
                    0 => continue,
                    1 => (RelationshipStrength::Weak, 0.4),
                    2 => (RelationshipStrength::Moderate, 0.6),
                    _ => (RelationshipStrength::Strong, 0.8),
                };
                found.push(
                    EventRelationship::new(
                        a.id.clone(),
                        b.id.clone(),
                        RelationshipKind::Supportive,
                        confidence,
                        DetectionMethod::SharedParticipants,
                    )
                    .with_strength(strength)
                    .with_time_gap(gap_days(timeline, &a.id, &b.id))
                    .with_evidence(format!("{} shared participant(s)", shared)),
                );
            }
        }
        found
    }

    fn insight_relationships(&self, insights: &ChronologyInsights) -> Vec<EventRelationship> {
        let mut found = Vec::new();
        for causal in &insights.causal_relationships {
            let mut relationship = EventRelationship::new(
                causal.cause_id.clone(),
                causal.effect_id.clone(),
                RelationshipKind::Causal,
                causal.confidence,
                DetectionMethod::CausalAnalysis,
            )
            .with_time_gap(Some(causal.delay_days));
            relationship.evidence = causal.evidence.clone();
            found.push(relationship);
        }

        for cluster in &insights.clusters {
            let Some(central) = &cluster.central_event_id else {
                continue;
            };
            for member in cluster.event_ids.iter().filter(|id| *id != central) {
                found.push(
                    EventRelationship::new(
                        central.clone(),
                        member.clone(),
                        RelationshipKind::Hierarchical,
                        cluster.coherence,
                        DetectionMethod::ClusterMembership,
                    )
                    .with_evidence(format!("member of cluster {}", cluster.name)),
                );
            }
        }

        for conflict in &insights.conflicts {
            let [first, second, ..] = conflict.event_ids.as_slice() else {
                continue;
            };
            let confidence = match conflict.severity {
                Severity::High => 0.9,
                Severity::Medium => 0.6,
                Severity::Low => 0.3,
            };
            found.push(
                EventRelationship::new(
                    first.clone(),
                    second.clone(),
                    RelationshipKind::Conflicting,
                    confidence,
                    DetectionMethod::ConflictAnalysis,
                )
                .with_evidence(conflict.description.clone()),
            );
        }
        found
    }

    // ========================================================================
    // Network insight
    // ========================================================================

    fn network_patterns(
        &self,
        timeline: &Timeline,
        relationships: &[EventRelationship],
    ) -> Vec<NetworkPattern> {
        let mut counts: BTreeMap<RelationshipKind, usize> = BTreeMap::new();
        for relationship in relationships {
            *counts.entry(relationship.kind).or_insert(0) += 1;
        }

        let mut patterns = Vec::new();
        let mut dominant: Option<(RelationshipKind, usize)> = None;
        for (&kind, &count) in &counts {
            if dominant.map_or(true, |(_, top)| count > top) {
                dominant = Some((kind, count));
            }
        }
        if let Some((kind, count)) = dominant {
            patterns.push(NetworkPattern {
                kind: NetworkPatternKind::DominantRelationship,
                relationship_kind: Some(kind),
                count,
                description: format!(
                    "{} of {} relationships are {}",
                    count,
                    relationships.len(),
                    kind.as_str()
                ),
            });
        }

        let causal = counts.get(&RelationshipKind::Causal).copied().unwrap_or(0);
        if causal > self.config.complex_causal_edges {
            patterns.push(NetworkPattern {
                kind: NetworkPatternKind::ComplexCausalNetwork,
                relationship_kind: Some(RelationshipKind::Causal),
                count: causal,
                description: format!("{} causal relationships form a complex causal network", causal),
            });
        }

        let concurrent = counts
            .get(&RelationshipKind::Concurrent)
            .copied()
            .unwrap_or(0);
        if concurrent > 0 && concurrent >= 3usize.max(timeline.len() / 4) {
            patterns.push(NetworkPattern {
                kind: NetworkPatternKind::HighConcurrency,
                relationship_kind: Some(RelationshipKind::Concurrent),
                count: concurrent,
                description: format!("{} concurrent relationships", concurrent),
            });
        }
        patterns
    }

    fn missing_relationships(
        &self,
        timeline: &Timeline,
        relationships: &[EventRelationship],
        entities: &[EntityRelationship],
    ) -> Vec<MissingRelationship> {
        let connected: BTreeSet<&EventId> = relationships
            .iter()
            .flat_map(|r| [&r.source_id, &r.target_id])
            .collect();

        let isolated = timeline
            .events
            .iter()
            .filter(|e| e.confidence >= self.config.isolated_event_confidence)
            .filter(|e| !connected.contains(&e.id))
            .map(|e| MissingRelationship {
                kind: MissingRelationshipKind::IsolatedEvent,
                event_ids: vec![e.id.clone()],
                entities: Vec::new(),
                description: format!(
                    "{} event {} has confidence {:.2} but no relationships",
                    e.event_type, e.id, e.confidence
                ),
            });

        let unexplained = entities
            .iter()
            .filter(|pair| pair.event_ids.len() >= self.config.entity_cooccurrence_threshold)
            .filter(|pair| !pair.is_explicit())
            .map(|pair| MissingRelationship {
                kind: MissingRelationshipKind::UnexplainedEntityPair,
                event_ids: pair.event_ids.clone(),
                entities: vec![pair.entity_a.clone(), pair.entity_b.clone()],
                description: format!(
                    "{} and {} appear together in {} events with no stated relationship",
                    pair.entity_a,
                    pair.entity_b,
                    pair.event_ids.len()
                ),
            });

        isolated
            .chain(unexplained)
            .take(self.config.missing_limit)
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Keep the highest-confidence relationship per `(source, target, kind)`;
/// the first one wins ties. Output is ordered by that key.
fn deduplicate(relationships: Vec<EventRelationship>) -> Vec<EventRelationship> {
    let mut best: BTreeMap<(EventId, EventId, RelationshipKind), EventRelationship> =
        BTreeMap::new();
    for relationship in relationships {
        let key = (
            relationship.source_id.clone(),
            relationship.target_id.clone(),
            relationship.kind,
        );
        match best.get(&key) {
            Some(kept) if kept.confidence >= relationship.confidence => {}
            _ => {
                best.insert(key, relationship);
            }
        }
    }
    best.into_values().collect()
}

fn dated_in_order(timeline: &Timeline) -> Vec<&TimelineEvent> {
    let mut dated: Vec<&TimelineEvent> = timeline.events.iter().filter(|e| e.is_dated()).collect();
    dated.sort_by_key(|e| e.sort_date());
    dated
}

fn gap_days(timeline: &Timeline, a: &EventId, b: &EventId) -> Option<i64> {
    let a = timeline.event(a)?.sort_date()?;
    let b = timeline.event(b)?.sort_date()?;
    Some((b - a).num_days().abs())
}

fn term_vector(text: &str) -> BTreeMap<String, f64> {
    let mut vector = BTreeMap::new();
    for term in terms(text) {
        *vector.entry(term).or_insert(0.0) += 1.0;
    }
    vector
}

fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, x)| b.get(term).map(|y| x * y))
        .sum();
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
