//! Hand-tuned legal domain tables.
//!
//! Causal pairs, procedural sequence templates, precedence requirements and
//! mutually exclusive event pairs are data, not code: [`DomainRules::default`]
//! carries the built-in tables and callers may replace any of them (for example
//! from a TOML config).

use serde::{Deserialize, Serialize};

use crate::event::{EventType, TimelineEvent};

/// An ordered `(cause, effect)` event-type pair that commonly indicates causation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalRule {
    pub cause: EventType,
    pub effect: EventType,
    /// Strong pairs start causal analysis at a higher confidence
    #[serde(default)]
    pub strong: bool,
}

impl CausalRule {
    pub const fn new(cause: EventType, effect: EventType, strong: bool) -> Self {
        Self {
            cause,
            effect,
            strong,
        }
    }
}

/// A named, ordered template of event types describing a known legal process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralSequence {
    pub name: String,
    pub steps: Vec<EventType>,
}

impl ProceduralSequence {
    pub fn new(name: impl Into<String>, steps: Vec<EventType>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Greedily match the template, in order, against chronologically sorted events.
    ///
    /// Returns the indices (into `events`) of the matched events, one per
    /// matched step.
    pub fn match_in_order(&self, events: &[&TimelineEvent]) -> Vec<usize> {
        let mut matched = Vec::new();
        let mut step = 0;
        for (idx, event) in events.iter().enumerate() {
            if step >= self.steps.len() {
                break;
            }
            if event.event_type == self.steps[step] {
                matched.push(idx);
                step += 1;
            }
        }
        matched
    }

    /// Position of `event_type` within the template.
    pub fn position(&self, event_type: EventType) -> Option<usize> {
        self.steps.iter().position(|&t| t == event_type)
    }

    /// Steps strictly between `from` and `to`, when both appear in that order.
    pub fn steps_between(&self, from: EventType, to: EventType) -> Option<&[EventType]> {
        let start = self.position(from)?;
        let end = self.steps[start + 1..]
            .iter()
            .position(|&t| t == to)
            .map(|offset| start + 1 + offset)?;
        Some(&self.steps[start + 1..end])
    }
}

/// An event type that should be preceded by at least one of `requires`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedenceRule {
    pub event_type: EventType,
    pub requires: Vec<EventType>,
}

/// All domain tables used across the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRules {
    pub causal_pairs: Vec<CausalRule>,
    pub sequences: Vec<ProceduralSequence>,
    pub precedence: Vec<PrecedenceRule>,
    /// Pairs of event types that cannot both occur within the conflict tolerance window
    pub exclusive_pairs: Vec<(EventType, EventType)>,
    /// Types treated as milestones / key events
    pub important_types: Vec<EventType>,
    /// Types that conclude a procedural step (orders, settlements, payments)
    pub outcome_types: Vec<EventType>,
}

impl Default for DomainRules {
    fn default() -> Self {
        use EventType::*;

        let causal_pairs = vec![
            CausalRule::new(Filing, Hearing, true),
            CausalRule::new(Filing, Motion, false),
            CausalRule::new(Filing, Discovery, false),
            CausalRule::new(Filing, Notification, false),
            CausalRule::new(Motion, Hearing, false),
            CausalRule::new(Motion, Order, true),
            CausalRule::new(Hearing, Order, true),
            CausalRule::new(Discovery, Deposition, true),
            CausalRule::new(Deposition, Trial, false),
            CausalRule::new(Discovery, Trial, false),
            CausalRule::new(Trial, Order, true),
            CausalRule::new(Settlement, Order, false),
            CausalRule::new(Settlement, Payment, true),
            CausalRule::new(Order, Payment, false),
            CausalRule::new(Order, Deadline, false),
            CausalRule::new(Contract, Payment, true),
            CausalRule::new(Contract, Transaction, false),
            CausalRule::new(Incident, Filing, true),
            CausalRule::new(Incident, Notification, false),
            CausalRule::new(Notification, Deadline, false),
            CausalRule::new(Notification, Filing, false),
            CausalRule::new(Communication, Meeting, false),
            CausalRule::new(Meeting, Contract, false),
            CausalRule::new(Regulatory, Notification, false),
            CausalRule::new(Employment, Incident, false),
        ];

        let sequences = vec![
            ProceduralSequence::new("litigation_filing", vec![Filing, Motion, Hearing, Order]),
            ProceduralSequence::new(
                "discovery_process",
                vec![Filing, Discovery, Deposition, Trial],
            ),
            ProceduralSequence::new("trial_judgment", vec![Deposition, Trial, Order, Payment]),
            ProceduralSequence::new(
                "settlement_process",
                vec![Filing, Settlement, Order, Payment],
            ),
            ProceduralSequence::new(
                "contract_lifecycle",
                vec![Communication, Meeting, Contract, Payment],
            ),
            ProceduralSequence::new(
                "employment_dispute",
                vec![Employment, Incident, Notification, Filing],
            ),
            ProceduralSequence::new(
                "regulatory_action",
                vec![Regulatory, Notification, Deadline, Order],
            ),
        ];

        let precedence = vec![
            PrecedenceRule {
                event_type: Motion,
                requires: vec![Filing],
            },
            PrecedenceRule {
                event_type: Hearing,
                requires: vec![Filing, Motion],
            },
            PrecedenceRule {
                event_type: Order,
                requires: vec![Filing, Motion, Hearing, Trial, Settlement],
            },
            PrecedenceRule {
                event_type: Deposition,
                requires: vec![Filing, Discovery],
            },
            PrecedenceRule {
                event_type: Trial,
                requires: vec![Filing],
            },
        ];

        Self {
            causal_pairs,
            sequences,
            precedence,
            exclusive_pairs: vec![(Trial, Trial), (Trial, Deposition)],
            important_types: vec![Filing, Order, Trial, Settlement, Contract, Deadline],
            outcome_types: vec![Order, Settlement, Payment],
        }
    }
}

impl DomainRules {
    /// Look up the causal rule for an ordered type pair.
    pub fn causal_rule(&self, cause: EventType, effect: EventType) -> Option<&CausalRule> {
        self.causal_pairs
            .iter()
            .find(|rule| rule.cause == cause && rule.effect == effect)
    }

    pub fn is_causal_pair(&self, cause: EventType, effect: EventType) -> bool {
        self.causal_rule(cause, effect).is_some()
    }

    /// Predecessor types required before `event_type`, if any.
    pub fn required_predecessors(&self, event_type: EventType) -> Option<&[EventType]> {
        self.precedence
            .iter()
            .find(|rule| rule.event_type == event_type)
            .map(|rule| rule.requires.as_slice())
    }

    /// Returns true if `prior` satisfies a precedence requirement of `later`.
    pub fn is_prerequisite(&self, prior: EventType, later: EventType) -> bool {
        self.required_predecessors(later)
            .map_or(false, |required| required.contains(&prior))
    }

    pub fn are_exclusive(&self, a: EventType, b: EventType) -> bool {
        self.exclusive_pairs
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub fn is_important(&self, event_type: EventType) -> bool {
        self.important_types.contains(&event_type)
    }

    pub fn is_outcome(&self, event_type: EventType) -> bool {
        self.outcome_types.contains(&event_type)
    }

    /// Event types that would normally appear between `from` and `to`,
    /// collected over every template that contains both in that order.
    pub fn missing_between(&self, from: EventType, to: EventType) -> Vec<EventType> {
        let mut missing = Vec::new();
        for sequence in &self.sequences {
            if let Some(steps) = sequence.steps_between(from, to) {
                for &step in steps {
                    if !missing.contains(&step) {
                        missing.push(step);
                    }
                }
            }
        }
        missing
    }
}
