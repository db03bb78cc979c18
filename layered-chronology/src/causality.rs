use chrono::Duration;
use layered_timeline::Timeline;

use crate::analyzer::{dated_in_order, sort_date, ChronologyAnalyzer};
use crate::insights::CausalRelationship;

const WEAK_PAIR_CONFIDENCE: f64 = 0.3;
const STRONG_PAIR_CONFIDENCE: f64 = 0.8;
const SHARED_PARTICIPANT_BONUS: f64 = 0.1;
const MAX_PARTICIPANT_BONUS: f64 = 0.3;
const PROMPT_DELAY_BONUS: f64 = 0.2;
const NEAR_DELAY_BONUS: f64 = 0.1;

impl ChronologyAnalyzer {
    /// Score cause/effect candidates between each dated event and the dated
    /// events shortly before it.
    ///
    /// Only type pairs in the causal table with a delay inside
    /// `max_causal_delay_days` are considered. Results are ordered by effect,
    /// then by nearest cause.
    pub fn analyze_causality(&self, timeline: &Timeline) -> Vec<CausalRelationship> {
        let dated = dated_in_order(timeline);
        let max_delay = Duration::days(self.config.max_causal_delay_days);
        let mut relationships = Vec::new();

        for (pos, &effect) in dated.iter().enumerate() {
            let lookback_start = pos.saturating_sub(self.config.causal_lookback);
            for &cause in dated[lookback_start..pos].iter().rev() {
                let Some(rule) = self.rules.causal_rule(cause.event_type, effect.event_type)
                else {
                    continue;
                };
                let delay = sort_date(effect) - sort_date(cause);
                if delay > max_delay {
                    continue;
                }

                let shared = cause.shared_participants(effect);
                let mut confidence = if rule.strong {
                    STRONG_PAIR_CONFIDENCE
                } else {
                    WEAK_PAIR_CONFIDENCE
                };
                confidence += (SHARED_PARTICIPANT_BONUS * shared as f64).min(MAX_PARTICIPANT_BONUS);
                if delay <= Duration::days(7) {
                    confidence += PROMPT_DELAY_BONUS;
                } else if delay <= Duration::days(30) {
                    confidence += NEAR_DELAY_BONUS;
                }

                let mut evidence = vec![
                    format!("{} commonly leads to {}", cause.event_type, effect.event_type),
                    format!("{} days apart", delay.num_days()),
                ];
                if shared > 0 {
                    let names: Vec<&str> = cause
                        .participants
                        .iter()
                        .filter(|p| effect.participants.contains(p))
                        .map(String::as_str)
                        .collect();
                    evidence.push(format!("shared participants: {}", names.join(", ")));
                }

                relationships.push(CausalRelationship {
                    cause_id: cause.id.clone(),
                    effect_id: effect.id.clone(),
                    cause_type: cause.event_type,
                    effect_type: effect.event_type,
                    delay_days: delay.num_days(),
                    confidence: confidence.min(1.0),
                    strong: rule.strong,
                    shared_participants: shared,
                    evidence,
                });
            }
        }

        tracing::debug!(relationships = relationships.len(), "causality analyzed");
        relationships
    }
}
