//! The analyzer entry point, statistics, scoring and recommendations.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use layered_timeline::{DomainRules, EventCertainty, EventId, Timeline, TimelineEvent};
use serde::{Deserialize, Serialize};

use crate::insights::{
    AnalysisType, ChronologyInsights, ChronologyStatistics, Severity, TimelineConflict,
    TimelineGap,
};

/// Thresholds and windows for every sub-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronologyConfig {
    /// Consecutive dated events further apart than this form a gap
    pub gap_threshold_days: i64,
    pub medium_gap_days: i64,
    pub high_gap_days: i64,
    /// Window for temporal clusters and batch patterns
    pub cluster_window_days: i64,
    pub min_cluster_size: usize,
    /// Minimum matched events for procedural and recurring patterns
    pub min_pattern_events: usize,
    pub min_recurring_confidence: f64,
    pub seasonal_min_events: usize,
    /// A month is seasonal when its count exceeds this multiple of the average
    /// count of the months that hold events
    pub seasonal_factor: f64,
    pub seasonal_min_month_events: usize,
    pub escalation_min_events: usize,
    /// Preceding dated events examined per event in causal analysis
    pub causal_lookback: usize,
    pub max_causal_delay_days: i64,
    /// Mutually exclusive events closer than this are an impossible timing
    pub conflict_tolerance_hours: i64,
    /// Search steps allowed when the causal graph contains cycles
    pub critical_path_budget: usize,
    pub milestone_confidence: f64,
    pub undated_ratio_warning: f64,
    pub low_confidence_warning: f64,
}

impl Default for ChronologyConfig {
    fn default() -> Self {
        Self {
            gap_threshold_days: 30,
            medium_gap_days: 90,
            high_gap_days: 180,
            cluster_window_days: 7,
            min_cluster_size: 3,
            min_pattern_events: 3,
            min_recurring_confidence: 0.5,
            seasonal_min_events: 6,
            seasonal_factor: 1.5,
            seasonal_min_month_events: 2,
            escalation_min_events: 4,
            causal_lookback: 5,
            max_causal_delay_days: 60,
            conflict_tolerance_hours: 24,
            critical_path_budget: 100_000,
            milestone_confidence: 0.8,
            undated_ratio_warning: 0.3,
            low_confidence_warning: 0.5,
        }
    }
}

impl ChronologyConfig {
    pub fn with_gap_threshold_days(mut self, days: i64) -> Self {
        self.gap_threshold_days = days;
        self
    }

    pub fn with_cluster_window_days(mut self, days: i64) -> Self {
        self.cluster_window_days = days;
        self
    }

    pub fn with_max_causal_delay_days(mut self, days: i64) -> Self {
        self.max_causal_delay_days = days;
        self
    }

    pub fn with_conflict_tolerance_hours(mut self, hours: i64) -> Self {
        self.conflict_tolerance_hours = hours;
        self
    }

    pub fn with_critical_path_budget(mut self, budget: usize) -> Self {
        self.critical_path_budget = budget;
        self
    }
}

/// Runs pattern, gap, cluster, causal, conflict and critical-path analyses
/// over a [`Timeline`].
///
/// The analyzer holds no state between calls: analyzing the same timeline with
/// the same requested analyses always yields identical insights.
#[derive(Debug, Clone, Default)]
pub struct ChronologyAnalyzer {
    pub(crate) config: ChronologyConfig,
    pub(crate) rules: DomainRules,
}

impl ChronologyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ChronologyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ChronologyConfig {
        &self.config
    }

    pub fn rules(&self) -> &DomainRules {
        &self.rules
    }

    /// Run every analysis.
    pub fn analyze_all(&self, timeline: &Timeline) -> ChronologyInsights {
        self.analyze(timeline, &AnalysisType::all())
    }

    /// Run the requested analyses. Statistics, milestones, the confidence
    /// score and recommendations are always computed.
    pub fn analyze(
        &self,
        timeline: &Timeline,
        requested: &BTreeSet<AnalysisType>,
    ) -> ChronologyInsights {
        let _span = tracing::debug_span!("analyze", events = timeline.len()).entered();

        let mut insights = ChronologyInsights {
            analyses: requested.clone(),
            statistics: self.statistics(timeline),
            milestones: self.milestones(timeline),
            ..ChronologyInsights::default()
        };

        for analysis in requested {
            match analysis {
                AnalysisType::Patterns => insights.patterns = self.detect_patterns(timeline),
                AnalysisType::Gaps => insights.gaps = self.identify_gaps(timeline),
                AnalysisType::Clusters => insights.clusters = self.cluster_events(timeline),
                AnalysisType::Causal => {
                    insights.causal_relationships = self.analyze_causality(timeline)
                }
                AnalysisType::Conflicts => insights.conflicts = self.detect_conflicts(timeline),
                AnalysisType::CriticalPath => {
                    insights.critical_path = self.find_critical_path(timeline)
                }
            }
        }

        insights.confidence_score = self.confidence_score(timeline, &insights);
        insights.recommendations = self.recommendations(timeline, &insights);

        tracing::debug!(
            patterns = insights.patterns.len(),
            gaps = insights.gaps.len(),
            clusters = insights.clusters.len(),
            causal = insights.causal_relationships.len(),
            conflicts = insights.conflicts.len(),
            critical_path = insights.critical_path.len(),
            confidence = insights.confidence_score,
            "chronology analyzed"
        );
        insights
    }

    // ========================================================================
    // Summary data
    // ========================================================================

    pub fn statistics(&self, timeline: &Timeline) -> ChronologyStatistics {
        let total = timeline.events.len();
        let dated = dated_in_order(timeline);

        let mut stats = ChronologyStatistics {
            total_events: total,
            dated_events: dated.len(),
            undated_events: total - dated.len(),
            ..ChronologyStatistics::default()
        };
        for event in &timeline.events {
            *stats.events_by_type.entry(event.event_type).or_insert(0) += 1;
            *stats.events_by_certainty.entry(event.certainty).or_insert(0) += 1;
        }
        if total > 0 {
            stats.average_confidence =
                timeline.events.iter().map(|e| e.confidence).sum::<f64>() / total as f64;
        }

        let first = dated.iter().filter_map(|e| e.sort_date()).min();
        let last = dated.iter().filter_map(|e| e.end_date()).max();
        if let (Some(first), Some(last)) = (first, last) {
            stats.span_days = (last - first).num_days();
        }
        if dated.len() >= 2 {
            let gaps: Vec<f64> = dated
                .windows(2)
                .map(|pair| days_between(sort_date(pair[0]), sort_date(pair[1])))
                .collect();
            stats.average_gap_days = gaps.iter().sum::<f64>() / gaps.len() as f64;
        }
        stats
    }

    /// Events of an important type, above the milestone confidence, or certain.
    pub fn milestones(&self, timeline: &Timeline) -> Vec<EventId> {
        timeline
            .events
            .iter()
            .filter(|e| {
                self.rules.is_important(e.event_type)
                    || e.confidence > self.config.milestone_confidence
                    || e.certainty == EventCertainty::Certain
            })
            .map(|e| e.id.clone())
            .collect()
    }

    /// Weighted blend of dating coverage, event confidence, pattern richness
    /// and a conflict penalty.
    pub fn confidence_score(&self, timeline: &Timeline, insights: &ChronologyInsights) -> f64 {
        if timeline.is_empty() {
            return 0.0;
        }
        let stats = &insights.statistics;
        let dated_ratio = stats.dated_events as f64 / stats.total_events as f64;
        let pattern_score = (insights.patterns.len() as f64 / 5.0).min(1.0);
        let conflict_penalty = (0.2 * insights.conflicts.len() as f64).min(1.0);

        let score = 0.3 * dated_ratio
            + 0.3 * stats.average_confidence
            + 0.2 * pattern_score
            + 0.2 * (1.0 - conflict_penalty);
        score.clamp(0.0, 1.0)
    }

    pub fn recommendations(&self, timeline: &Timeline, insights: &ChronologyInsights) -> Vec<String> {
        let mut recommendations = Vec::new();
        if timeline.is_empty() {
            return recommendations;
        }

        for gap in insights.high_significance_gaps() {
            recommendations.push(gap_recommendation(gap));
        }

        if !insights.conflicts.is_empty() {
            let high = insights
                .conflicts
                .iter()
                .filter(|c| c.severity == Severity::High)
                .count();
            recommendations.push(conflict_recommendation(&insights.conflicts, high));
        }

        let stats = &insights.statistics;
        let undated_ratio = stats.undated_events as f64 / stats.total_events as f64;
        if undated_ratio > self.config.undated_ratio_warning {
            recommendations.push(format!(
                "{:.0}% of events are undated; add dates from the source documents to improve ordering.",
                undated_ratio * 100.0
            ));
        }

        if insights.confidence_score < self.config.low_confidence_warning {
            recommendations.push(format!(
                "Overall chronology confidence is low ({:.2}); verify extracted events against the source documents.",
                insights.confidence_score
            ));
        }
        recommendations
    }
}

fn gap_recommendation(gap: &TimelineGap) -> String {
    if gap.missing_event_types.is_empty() {
        format!(
            "Investigate the {} day gap between {} and {}.",
            gap.duration_days, gap.start_event_id, gap.end_event_id
        )
    } else {
        let expected: Vec<&str> = gap.missing_event_types.iter().map(|t| t.as_str()).collect();
        format!(
            "Investigate the {} day gap between {} and {}; look for missing {} events.",
            gap.duration_days,
            gap.start_event_id,
            gap.end_event_id,
            expected.join(", ")
        )
    }
}

fn conflict_recommendation(conflicts: &[TimelineConflict], high: usize) -> String {
    format!(
        "Resolve {} timeline conflict(s), {} of high severity.",
        conflicts.len(),
        high
    )
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Dated events in chronological order. Stable, so assembled timelines keep
/// their order and hand-built ones are sorted.
pub(crate) fn dated_in_order(timeline: &Timeline) -> Vec<&TimelineEvent> {
    let mut dated: Vec<&TimelineEvent> = timeline.events.iter().filter(|e| e.is_dated()).collect();
    dated.sort_by_key(|e| e.sort_date());
    dated
}

/// Sort date of an event already known to be dated.
pub(crate) fn sort_date(event: &TimelineEvent) -> NaiveDateTime {
    event.sort_date().unwrap_or(NaiveDateTime::MAX)
}

pub(crate) fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}
