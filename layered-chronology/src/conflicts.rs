use chrono::Duration;
use layered_timeline::{EventType, Timeline};

use crate::analyzer::{dated_in_order, sort_date, ChronologyAnalyzer};
use crate::insights::{ConflictType, Severity, TimelineConflict};

impl ChronologyAnalyzer {
    /// Sequence violations, impossible timings and causality violations.
    pub fn detect_conflicts(&self, timeline: &Timeline) -> Vec<TimelineConflict> {
        let mut conflicts = self.sequence_violations(timeline);
        conflicts.extend(self.impossible_timings(timeline));
        conflicts.extend(self.causality_violations(timeline));
        conflicts.extend(self.deadline_violations(timeline));
        conflicts.extend(self.missing_prerequisites(timeline));
        tracing::debug!(conflicts = conflicts.len(), "conflicts detected");
        conflicts
    }

    /// A dated event whose precedence requirement has no dated predecessor.
    fn sequence_violations(&self, timeline: &Timeline) -> Vec<TimelineConflict> {
        let dated = dated_in_order(timeline);
        let mut conflicts = Vec::new();
        for (pos, &event) in dated.iter().enumerate() {
            let Some(required) = self.rules.required_predecessors(event.event_type) else {
                continue;
            };
            let satisfied = dated[..pos]
                .iter()
                .any(|prior| required.contains(&prior.event_type));
            if satisfied {
                continue;
            }
            let expected = type_list(required);
            conflicts.push(TimelineConflict {
                conflict_type: ConflictType::SequenceViolation,
                severity: Severity::Medium,
                event_ids: vec![event.id.clone()],
                description: format!(
                    "{} occurs without a preceding {}",
                    event.event_type, expected
                ),
                suggested_resolution: Some(format!(
                    "Check the source documents for an earlier {} event or correct the date of {}",
                    expected, event.id
                )),
            });
        }
        conflicts
    }

    /// Mutually exclusive events within the conflict tolerance of each other.
    fn impossible_timings(&self, timeline: &Timeline) -> Vec<TimelineConflict> {
        let dated = dated_in_order(timeline);
        let tolerance = Duration::hours(self.config.conflict_tolerance_hours);
        let mut conflicts = Vec::new();
        for (pos, &first) in dated.iter().enumerate() {
            for &second in &dated[pos + 1..] {
                let apart = sort_date(second) - sort_date(first);
                if apart > tolerance {
                    break;
                }
                if !self.rules.are_exclusive(first.event_type, second.event_type) {
                    continue;
                }
                conflicts.push(TimelineConflict {
                    conflict_type: ConflictType::ImpossibleTiming,
                    severity: Severity::High,
                    event_ids: vec![first.id.clone(), second.id.clone()],
                    description: format!(
                        "{} and {} are {} hours apart",
                        first.event_type,
                        second.event_type,
                        apart.num_hours()
                    ),
                    suggested_resolution: Some(
                        "Verify both dates; one event may be misdated or duplicated".to_string(),
                    ),
                });
            }
        }
        conflicts
    }

    /// A `causedBy` link whose cause is dated after its effect.
    fn causality_violations(&self, timeline: &Timeline) -> Vec<TimelineConflict> {
        let mut conflicts = Vec::new();
        for effect in &timeline.events {
            let Some(effect_date) = effect.sort_date() else {
                continue;
            };
            for cause_id in &effect.caused_by {
                let Some(cause) = timeline.event(cause_id) else {
                    continue;
                };
                let Some(cause_date) = cause.sort_date() else {
                    continue;
                };
                if cause_date > effect_date {
                    conflicts.push(TimelineConflict {
                        conflict_type: ConflictType::CausalityViolation,
                        severity: Severity::High,
                        event_ids: vec![cause.id.clone(), effect.id.clone()],
                        description: format!(
                            "{} is recorded as causing {} but occurs after it",
                            cause.id, effect.id
                        ),
                        suggested_resolution: Some(
                            "Remove the causal link or correct the event dates".to_string(),
                        ),
                    });
                }
            }
        }
        conflicts
    }

    /// Hook for deadline checks; deadlines carry no completion data yet.
    fn deadline_violations(&self, _timeline: &Timeline) -> Vec<TimelineConflict> {
        Vec::new()
    }

    /// Hook for prerequisite checks beyond the precedence table.
    fn missing_prerequisites(&self, _timeline: &Timeline) -> Vec<TimelineConflict> {
        Vec::new()
    }
}

fn type_list(types: &[EventType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}
