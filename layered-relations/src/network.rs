//! Relationship network types and graph metrics.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDateTime;
use layered_timeline::{EventId, Timeline};
use pathfinding::prelude::{dijkstra_all, strongly_connected_components};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationReport;

// ============================================================================
// Event relationships
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Causal,
    Temporal,
    Procedural,
    Concurrent,
    Conditional,
    Hierarchical,
    Conflicting,
    Supportive,
    Prerequisite,
    Outcome,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Causal => "causal",
            RelationshipKind::Temporal => "temporal",
            RelationshipKind::Procedural => "procedural",
            RelationshipKind::Concurrent => "concurrent",
            RelationshipKind::Conditional => "conditional",
            RelationshipKind::Hierarchical => "hierarchical",
            RelationshipKind::Conflicting => "conflicting",
            RelationshipKind::Supportive => "supportive",
            RelationshipKind::Prerequisite => "prerequisite",
            RelationshipKind::Outcome => "outcome",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStrength {
    Definitive,
    Strong,
    Moderate,
    Weak,
    Speculative,
}

impl RelationshipStrength {
    /// Tier for a confidence in `[0, 1]`.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            RelationshipStrength::Definitive
        } else if confidence >= 0.7 {
            RelationshipStrength::Strong
        } else if confidence >= 0.5 {
            RelationshipStrength::Moderate
        } else if confidence >= 0.3 {
            RelationshipStrength::Weak
        } else {
            RelationshipStrength::Speculative
        }
    }
}

/// Which generator produced a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    DirectLink,
    TemporalProximity,
    ProceduralSequence,
    ContentSimilarity,
    SharedParticipants,
    CausalAnalysis,
    ClusterMembership,
    ConflictAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRelationship {
    /// `source->target:kind`
    pub id: String,
    pub source_id: EventId,
    pub target_id: EventId,
    pub kind: RelationshipKind,
    pub strength: RelationshipStrength,
    pub confidence: f64,
    #[serde(default)]
    pub time_gap_days: Option<i64>,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub method: DetectionMethod,
}

impl EventRelationship {
    pub fn new(
        source_id: EventId,
        target_id: EventId,
        kind: RelationshipKind,
        confidence: f64,
        method: DetectionMethod,
    ) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            id: format!("{}->{}:{}", source_id, target_id, kind.as_str()),
            source_id,
            target_id,
            kind,
            strength: RelationshipStrength::from_confidence(confidence),
            confidence,
            time_gap_days: None,
            evidence: Vec::new(),
            method,
        }
    }

    pub fn with_strength(mut self, strength: RelationshipStrength) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_time_gap(mut self, days: Option<i64>) -> Self {
        self.time_gap_days = days;
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    pub fn involves(&self, id: &EventId) -> bool {
        &self.source_id == id || &self.target_id == id
    }
}

// ============================================================================
// Entity relationships
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRelationLabel {
    Adversarial,
    Representative,
    Authoritative,
    Contractual,
    Collaborative,
}

/// Two participants that appear in the same events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRelationship {
    /// Lexicographically smaller name
    pub entity_a: String,
    pub entity_b: String,
    pub event_ids: Vec<EventId>,
    pub label: EntityRelationLabel,
    /// Relationship phrases matched in the supporting sentences
    #[serde(default)]
    pub evidence: Vec<String>,
    pub strength: RelationshipStrength,
    pub confidence: f64,
    #[serde(default)]
    pub first_observed: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_observed: Option<NaiveDateTime>,
}

impl EntityRelationship {
    /// An explicit relationship phrase links the pair.
    pub fn is_explicit(&self) -> bool {
        !self.evidence.is_empty()
    }
}

// ============================================================================
// Network
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub average_path_length: f64,
    pub clustering_coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkPatternKind {
    DominantRelationship,
    ComplexCausalNetwork,
    HighConcurrency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPattern {
    pub kind: NetworkPatternKind,
    #[serde(default)]
    pub relationship_kind: Option<RelationshipKind>,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRelationshipKind {
    /// A high-confidence event with no relationships at all
    IsolatedEvent,
    /// Participants that often appear together without a relationship phrase
    UnexplainedEntityPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingRelationship {
    pub kind: MissingRelationshipKind,
    #[serde(default)]
    pub event_ids: Vec<EventId>,
    #[serde(default)]
    pub entities: Vec<String>,
    pub description: String,
}

/// Everything the mapper produced for one timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipNetwork {
    pub event_relationships: Vec<EventRelationship>,
    pub entity_relationships: Vec<EntityRelationship>,
    pub metrics: NetworkMetrics,
    pub central_events: Vec<EventId>,
    pub central_entities: Vec<String>,
    pub patterns: Vec<NetworkPattern>,
    pub potential_missing_relationships: Vec<MissingRelationship>,
    pub validation: ValidationReport,
}

impl RelationshipNetwork {
    pub fn relationships_of(&self, kind: RelationshipKind) -> Vec<&EventRelationship> {
        self.event_relationships
            .iter()
            .filter(|r| r.kind == kind)
            .collect()
    }

    pub fn relationships_for(&self, id: &EventId) -> Vec<&EventRelationship> {
        self.event_relationships
            .iter()
            .filter(|r| r.involves(id))
            .collect()
    }
}

// ============================================================================
// Graph metrics
// ============================================================================

/// Directed graph over timeline event positions. Edges whose endpoints are not
/// on the timeline, and self loops, are ignored.
pub(crate) struct EventGraph {
    successors: Vec<BTreeSet<usize>>,
    neighbors: Vec<BTreeSet<usize>>,
}

impl EventGraph {
    pub(crate) fn new(timeline: &Timeline, relationships: &[EventRelationship]) -> Self {
        let index = timeline.index();
        let n = timeline.events.len();
        let mut successors = vec![BTreeSet::new(); n];
        let mut neighbors = vec![BTreeSet::new(); n];
        for relationship in relationships {
            let (Some(&source), Some(&target)) = (
                index.get(&relationship.source_id),
                index.get(&relationship.target_id),
            ) else {
                continue;
            };
            if source == target {
                continue;
            }
            successors[source].insert(target);
            neighbors[source].insert(target);
            neighbors[target].insert(source);
        }
        Self {
            successors,
            neighbors,
        }
    }

    pub(crate) fn metrics(&self) -> NetworkMetrics {
        let n = self.successors.len();
        let edge_count = self.successors.iter().map(BTreeSet::len).sum();
        let density = if n > 1 {
            edge_count as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        NetworkMetrics {
            node_count: n,
            edge_count,
            density,
            average_path_length: self.average_path_length(),
            clustering_coefficient: self.clustering_coefficient(),
        }
    }

    /// Mean shortest-path length inside the largest strongly connected
    /// component (the whole graph when it is strongly connected).
    fn average_path_length(&self) -> f64 {
        let nodes: Vec<usize> = (0..self.successors.len()).collect();
        let components = strongly_connected_components(&nodes, |&n| {
            self.successors[n].iter().copied()
        });
        let Some(largest) = components
            .into_iter()
            .map(|mut component| {
                component.sort_unstable();
                component
            })
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b[0].cmp(&a[0])))
        else {
            return 0.0;
        };
        let k = largest.len();
        if k < 2 {
            return 0.0;
        }

        let members: HashSet<usize> = largest.iter().copied().collect();
        let mut total = 0usize;
        for &start in &largest {
            let reached = dijkstra_all(&start, |&n| {
                self.successors[n]
                    .iter()
                    .filter(|&&m| members.contains(&m))
                    .map(|&m| (m, 1usize))
                    .collect::<Vec<_>>()
            });
            total += reached.values().map(|&(_, cost)| cost).sum::<usize>();
        }
        total as f64 / (k * (k - 1)) as f64
    }

    /// Average local clustering coefficient of the undirected view.
    fn clustering_coefficient(&self) -> f64 {
        let n = self.neighbors.len();
        if n == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        for around in &self.neighbors {
            let k = around.len();
            if k < 2 {
                continue;
            }
            let around: Vec<usize> = around.iter().copied().collect();
            let mut links = 0usize;
            for (i, &a) in around.iter().enumerate() {
                for &b in &around[i + 1..] {
                    if self.neighbors[a].contains(&b) {
                        links += 1;
                    }
                }
            }
            total += links as f64 / (k * (k - 1) / 2) as f64;
        }
        total / n as f64
    }

    /// Up to `limit` event positions by undirected degree, ties by position.
    pub(crate) fn central_nodes(&self, limit: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, usize)> = self
            .neighbors
            .iter()
            .enumerate()
            .filter(|(_, around)| !around.is_empty())
            .map(|(node, around)| (node, around.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(limit).map(|(node, _)| node).collect()
    }
}

/// Up to `limit` participants by number of events, ties by name.
pub(crate) fn central_entities(timeline: &Timeline, limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in &timeline.events {
        for participant in &event.participants {
            *counts.entry(participant.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}
