//! Analysis outputs.
//!
//! Every output references events by [`EventId`] value, so insights stay
//! valid after the [`Timeline`](layered_timeline::Timeline) they were computed
//! from is dropped.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use layered_timeline::{DateRange, EventCertainty, EventId, EventType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Analysis selection
// ============================================================================

/// A sub-analysis that can be requested from the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Patterns,
    Gaps,
    Clusters,
    Causal,
    Conflicts,
    CriticalPath,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 6] = [
        AnalysisType::Patterns,
        AnalysisType::Gaps,
        AnalysisType::Clusters,
        AnalysisType::Causal,
        AnalysisType::Conflicts,
        AnalysisType::CriticalPath,
    ];

    /// Every analysis.
    pub fn all() -> BTreeSet<AnalysisType> {
        Self::ALL.iter().copied().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Patterns => "patterns",
            AnalysisType::Gaps => "gaps",
            AnalysisType::Clusters => "clusters",
            AnalysisType::Causal => "causal",
            AnalysisType::Conflicts => "conflicts",
            AnalysisType::CriticalPath => "critical_path",
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    /// Events following a named procedural template in order
    ProceduralSequence,
    /// Same-type events at a regular interval
    Recurring,
    /// A calendar month with markedly more events than average
    Seasonal,
    /// Activity increasing over the timeline span
    Escalation,
    /// A burst of related events within a short window
    Batch,
}

/// A recognized temporal pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPattern {
    pub pattern_type: PatternType,
    pub name: String,
    pub description: String,
    pub event_ids: Vec<EventId>,
    /// Interval label for recurring patterns ("weekly", "every 12 days")
    #[serde(default)]
    pub frequency: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

// ============================================================================
// Gaps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Low,
    Medium,
    High,
}

/// A long interval between consecutive dated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGap {
    pub start_event_id: EventId,
    pub end_event_id: EventId,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration_days: i64,
    pub significance: Significance,
    /// Event types procedural templates expect between the two endpoints
    #[serde(default)]
    pub missing_event_types: Vec<EventType>,
    pub description: String,
}

// ============================================================================
// Clusters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    Temporal,
    EventType,
    Participant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCluster {
    pub name: String,
    pub kind: ClusterKind,
    pub event_ids: Vec<EventId>,
    #[serde(default)]
    pub central_event_id: Option<EventId>,
    /// Mean pairwise relatedness in `[0, 1]`
    pub coherence: f64,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    pub description: String,
}

// ============================================================================
// Causality
// ============================================================================

/// A scored cause/effect candidate between two dated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalRelationship {
    pub cause_id: EventId,
    pub effect_id: EventId,
    pub cause_type: EventType,
    pub effect_type: EventType,
    pub delay_days: i64,
    pub confidence: f64,
    /// The type pair is marked strong in the causal table
    pub strong: bool,
    pub shared_participants: usize,
    #[serde(default)]
    pub evidence: Vec<String>,
}

// ============================================================================
// Conflicts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    SequenceViolation,
    ImpossibleTiming,
    CausalityViolation,
    DeadlineViolation,
    MissingPrerequisite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineConflict {
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub event_ids: Vec<EventId>,
    pub description: String,
    #[serde(default)]
    pub suggested_resolution: Option<String>,
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChronologyStatistics {
    pub total_events: usize,
    pub dated_events: usize,
    pub undated_events: usize,
    /// Days from the earliest to the latest dated instant
    pub span_days: i64,
    pub events_by_type: BTreeMap<EventType, usize>,
    pub events_by_certainty: BTreeMap<EventCertainty, usize>,
    pub average_confidence: f64,
    /// Mean interval between consecutive dated events
    pub average_gap_days: f64,
}

/// Everything the analyzer produced for one timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChronologyInsights {
    /// The analyses that were run
    pub analyses: BTreeSet<AnalysisType>,
    pub patterns: Vec<TemporalPattern>,
    pub gaps: Vec<TimelineGap>,
    pub clusters: Vec<EventCluster>,
    pub causal_relationships: Vec<CausalRelationship>,
    pub conflicts: Vec<TimelineConflict>,
    pub critical_path: Vec<EventId>,
    pub milestones: Vec<EventId>,
    pub statistics: ChronologyStatistics,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
}

impl ChronologyInsights {
    pub fn conflicts_of(&self, conflict_type: ConflictType) -> Vec<&TimelineConflict> {
        self.conflicts
            .iter()
            .filter(|c| c.conflict_type == conflict_type)
            .collect()
    }

    pub fn patterns_of(&self, pattern_type: PatternType) -> Vec<&TemporalPattern> {
        self.patterns
            .iter()
            .filter(|p| p.pattern_type == pattern_type)
            .collect()
    }

    pub fn high_significance_gaps(&self) -> impl Iterator<Item = &TimelineGap> {
        self.gaps
            .iter()
            .filter(|g| g.significance == Significance::High)
    }
}
