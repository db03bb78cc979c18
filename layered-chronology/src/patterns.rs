//! Temporal pattern detection.
//!
//! - **Procedural sequences**: greedy in-order matching of each template
//! - **Recurring**: regular inter-arrival intervals within one event type
//! - **Seasonal**: calendar months well above the average occupied month
//! - **Escalation**: activity rising across four equal time buckets
//! - **Batch**: bursts of same-type or communication events inside the cluster window

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Month};
use layered_timeline::{DateRange, EventCategory, EventType, Timeline, TimelineEvent};

use crate::analyzer::{dated_in_order, days_between, sort_date, ChronologyAnalyzer};
use crate::insights::{PatternType, TemporalPattern};

impl ChronologyAnalyzer {
    /// All pattern kinds, in the order procedural, recurring, seasonal,
    /// escalation, batch.
    pub fn detect_patterns(&self, timeline: &Timeline) -> Vec<TemporalPattern> {
        let dated = dated_in_order(timeline);
        let mut patterns = self.procedural_patterns(&dated);
        patterns.extend(self.recurring_patterns(&dated));
        patterns.extend(self.seasonal_patterns(&dated));
        patterns.extend(self.escalation_pattern(&dated));
        patterns.extend(self.batch_patterns(&dated));
        tracing::debug!(patterns = patterns.len(), "patterns detected");
        patterns
    }

    /// Match every procedural template against the dated events in order.
    pub fn detect_procedural_patterns(&self, timeline: &Timeline) -> Vec<TemporalPattern> {
        self.procedural_patterns(&dated_in_order(timeline))
    }

    fn procedural_patterns(&self, dated: &[&TimelineEvent]) -> Vec<TemporalPattern> {
        let mut patterns = Vec::new();
        for sequence in &self.rules.sequences {
            if sequence.steps.is_empty() {
                continue;
            }
            let matched = sequence.match_in_order(dated);
            if matched.len() < self.config.min_pattern_events {
                continue;
            }
            let events: Vec<&TimelineEvent> = matched.iter().map(|&idx| dated[idx]).collect();
            let steps: Vec<&str> = sequence.steps.iter().map(|s| s.as_str()).collect();
            patterns.push(TemporalPattern {
                pattern_type: PatternType::ProceduralSequence,
                name: sequence.name.clone(),
                description: format!(
                    "{} of {} steps of {} ({})",
                    matched.len(),
                    sequence.steps.len(),
                    sequence.name,
                    steps.join(" -> ")
                ),
                event_ids: events.iter().map(|e| e.id.clone()).collect(),
                frequency: None,
                confidence: matched.len() as f64 / sequence.steps.len() as f64,
                date_range: span(&events),
            });
        }
        patterns
    }

    fn recurring_patterns(&self, dated: &[&TimelineEvent]) -> Vec<TemporalPattern> {
        let mut patterns = Vec::new();
        for (event_type, events) in group_by_type(dated) {
            if events.len() < self.config.min_pattern_events {
                continue;
            }
            let intervals: Vec<f64> = events
                .windows(2)
                .map(|pair| days_between(sort_date(pair[0]), sort_date(pair[1])))
                .collect();
            let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
            if mean <= 0.0 {
                continue;
            }
            let variance =
                intervals.iter().map(|i| (i - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
            let confidence = (1.0 - variance.sqrt() / mean).max(0.0);
            tracing::trace!(%event_type, mean, confidence, "recurring candidate");
            if confidence < self.config.min_recurring_confidence {
                continue;
            }

            let frequency = interval_label(mean);
            patterns.push(TemporalPattern {
                pattern_type: PatternType::Recurring,
                name: format!("recurring_{}", event_type),
                description: format!(
                    "{} {} events recurring {}",
                    events.len(),
                    event_type,
                    frequency
                ),
                event_ids: events.iter().map(|e| e.id.clone()).collect(),
                frequency: Some(frequency),
                confidence,
                date_range: span(&events),
            });
        }
        patterns
    }

    fn seasonal_patterns(&self, dated: &[&TimelineEvent]) -> Vec<TemporalPattern> {
        if dated.len() < self.config.seasonal_min_events {
            return Vec::new();
        }
        let mut by_month: BTreeMap<u32, Vec<&TimelineEvent>> = BTreeMap::new();
        for &event in dated {
            by_month.entry(sort_date(event).month()).or_default().push(event);
        }
        let average = dated.len() as f64 / by_month.len() as f64;

        by_month
            .into_iter()
            .filter(|(_, events)| {
                events.len() >= self.config.seasonal_min_month_events
                    && events.len() as f64 > self.config.seasonal_factor * average
            })
            .map(|(month, events)| {
                let month_name = u8::try_from(month)
                    .ok()
                    .and_then(|m| Month::try_from(m).ok())
                    .map_or("unknown", |m| m.name());
                TemporalPattern {
                    pattern_type: PatternType::Seasonal,
                    name: format!("seasonal_{}", month_name.to_lowercase()),
                    description: format!(
                        "{} events in {} against a monthly average of {:.1}",
                        events.len(),
                        month_name,
                        average
                    ),
                    event_ids: events.iter().map(|e| e.id.clone()).collect(),
                    frequency: Some("annual".to_string()),
                    confidence: (1.0 - average / events.len() as f64).clamp(0.0, 1.0),
                    date_range: span(&events),
                }
            })
            .collect()
    }

    fn escalation_pattern(&self, dated: &[&TimelineEvent]) -> Option<TemporalPattern> {
        if dated.len() < self.config.escalation_min_events {
            return None;
        }
        let first = sort_date(dated[0]);
        let total = (sort_date(dated[dated.len() - 1]) - first).num_seconds();
        if total <= 0 {
            return None;
        }

        let mut buckets = [0usize; 4];
        for &event in dated {
            let offset = (sort_date(event) - first).num_seconds();
            let bucket = ((offset as f64 / total as f64) * 4.0) as usize;
            buckets[bucket.min(3)] += 1;
        }
        let increases = buckets.windows(2).filter(|w| w[1] > w[0]).count();
        tracing::trace!(?buckets, increases, "escalation buckets");
        if increases < 2 || buckets[3] <= buckets[0] {
            return None;
        }

        Some(TemporalPattern {
            pattern_type: PatternType::Escalation,
            name: "escalation".to_string(),
            description: format!(
                "activity rises across the timeline (bucket counts {:?})",
                buckets
            ),
            event_ids: dated.iter().map(|e| e.id.clone()).collect(),
            frequency: None,
            confidence: increases as f64 / 3.0,
            date_range: span(dated),
        })
    }

    fn batch_patterns(&self, dated: &[&TimelineEvent]) -> Vec<TemporalPattern> {
        let window = Duration::days(self.config.cluster_window_days);
        let mut patterns: Vec<TemporalPattern> = Vec::new();

        for (event_type, events) in group_by_type(dated) {
            for batch in windowed(&events, window, self.config.min_cluster_size) {
                patterns.push(batch_pattern(format!("batch_{}", event_type), &batch));
            }
        }

        let communications: Vec<&TimelineEvent> = dated
            .iter()
            .copied()
            .filter(|e| e.event_type.category() == EventCategory::Communication)
            .collect();
        for batch in windowed(&communications, window, self.config.min_cluster_size) {
            let pattern = batch_pattern("batch_communications".to_string(), &batch);
            if !patterns.iter().any(|p| p.event_ids == pattern.event_ids) {
                patterns.push(pattern);
            }
        }
        patterns
    }
}

fn batch_pattern(name: String, events: &[&TimelineEvent]) -> TemporalPattern {
    TemporalPattern {
        pattern_type: PatternType::Batch,
        description: format!("{} related events within one window", events.len()),
        name,
        event_ids: events.iter().map(|e| e.id.clone()).collect(),
        frequency: None,
        confidence: (0.5 + 0.1 * events.len() as f64).min(1.0),
        date_range: span(events),
    }
}

/// Classify a mean interval in days.
pub(crate) fn interval_label(mean_days: f64) -> String {
    match mean_days {
        d if (5.0..=9.0).contains(&d) => "weekly".to_string(),
        d if (25.0..=35.0).contains(&d) => "monthly".to_string(),
        d if (80.0..=100.0).contains(&d) => "quarterly".to_string(),
        d if (350.0..=380.0).contains(&d) => "annual".to_string(),
        d => format!("every {} days", d.round() as i64),
    }
}

pub(crate) fn group_by_type<'a>(
    events: &[&'a TimelineEvent],
) -> BTreeMap<EventType, Vec<&'a TimelineEvent>> {
    let mut groups: BTreeMap<EventType, Vec<&TimelineEvent>> = BTreeMap::new();
    for &event in events {
        groups.entry(event.event_type).or_default().push(event);
    }
    groups
}

/// Split chronologically sorted events into windows anchored at each
/// window's first event, keeping windows with at least `min_size` events.
pub(crate) fn windowed<'a>(
    events: &[&'a TimelineEvent],
    window: Duration,
    min_size: usize,
) -> Vec<Vec<&'a TimelineEvent>> {
    let mut groups = Vec::new();
    let mut current: Vec<&TimelineEvent> = Vec::new();
    for &event in events {
        if let Some(&anchor) = current.first() {
            if sort_date(event) - sort_date(anchor) > window {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(event);
    }
    groups.push(current);
    groups.retain(|group| group.len() >= min_size.max(1));
    groups
}

pub(crate) fn span(events: &[&TimelineEvent]) -> Option<DateRange> {
    let start = events.iter().filter_map(|e| e.sort_date()).min()?;
    let end = events.iter().filter_map(|e| e.end_date()).max()?;
    Some(DateRange::new(start, end))
}
