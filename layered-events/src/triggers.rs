//! Trigger phrase table: which wording signals which event type.

use layered_timeline::EventType;

/// Trigger patterns for one event type, with the confidence bonus a match earns.
pub(crate) struct TriggerSpec {
    pub event_type: EventType,
    pub strength: f64,
    pub patterns: &'static [&'static str],
}

/// Every event type except `Unknown`. Patterns are case-insensitive regex
/// fragments joined into one word-bounded alternation per type.
pub(crate) const TRIGGERS: &[TriggerSpec] = &[
    TriggerSpec {
        event_type: EventType::Filing,
        strength: 0.3,
        patterns: &[
            r"filed",
            r"filing",
            r"lodged",
            r"submitted\s+(?:a|an|the)\s+(?:complaint|petition|brief|claim)",
            r"commenced\s+(?:an|the)\s+action",
        ],
    },
    TriggerSpec {
        event_type: EventType::Hearing,
        strength: 0.3,
        patterns: &[r"hearing", r"oral\s+argument", r"appeared\s+before", r"arraignment"],
    },
    TriggerSpec {
        event_type: EventType::Motion,
        strength: 0.25,
        patterns: &[r"motions?", r"moved\s+(?:to|for)", r"move\s+to\s+(?:dismiss|compel|strike)"],
    },
    TriggerSpec {
        event_type: EventType::Order,
        strength: 0.3,
        patterns: &[r"order(?:ed)?", r"ruling", r"ruled", r"judgment", r"decree", r"granted", r"denied"],
    },
    TriggerSpec {
        event_type: EventType::Discovery,
        strength: 0.2,
        patterns: &[
            r"discovery",
            r"interrogator(?:y|ies)",
            r"requests?\s+for\s+production",
            r"subpoena(?:ed|s)?",
        ],
    },
    TriggerSpec {
        event_type: EventType::Deposition,
        strength: 0.25,
        patterns: &[r"depositions?", r"deposed", r"testified\s+under\s+oath"],
    },
    TriggerSpec {
        event_type: EventType::Settlement,
        strength: 0.3,
        patterns: &[r"settle(?:d|ment)?", r"mediation", r"compromise"],
    },
    TriggerSpec {
        event_type: EventType::Trial,
        strength: 0.3,
        patterns: &[r"trial", r"jury\s+selection", r"verdict"],
    },
    TriggerSpec {
        event_type: EventType::Contract,
        strength: 0.25,
        patterns: &[r"contract", r"agreement", r"signed", r"executed", r"entered\s+into"],
    },
    TriggerSpec {
        event_type: EventType::Deadline,
        strength: 0.2,
        patterns: &[
            r"deadline",
            r"due\s+(?:date|by|on)",
            r"no\s+later\s+than",
            r"expires?",
            r"must\s+be\s+(?:filed|served|completed|paid)\s+by",
        ],
    },
    TriggerSpec {
        event_type: EventType::Communication,
        strength: 0.1,
        patterns: &[r"e-?mail(?:ed)?", r"letter", r"called", r"phone\s+call", r"wrote\s+to", r"correspondence"],
    },
    TriggerSpec {
        event_type: EventType::Transaction,
        strength: 0.15,
        patterns: &[r"transaction", r"transferred", r"purchased?", r"sold", r"acquired", r"wire\s+transfer"],
    },
    TriggerSpec {
        event_type: EventType::Incident,
        strength: 0.2,
        patterns: &[r"incident", r"accident", r"injur(?:y|ed|ies)", r"breach(?:ed)?", r"violat(?:ed|ion)", r"occurred"],
    },
    TriggerSpec {
        event_type: EventType::Meeting,
        strength: 0.15,
        patterns: &[r"meeting", r"met\s+with", r"conference", r"convened"],
    },
    TriggerSpec {
        event_type: EventType::Notification,
        strength: 0.15,
        patterns: &[r"notif(?:y|ied|ication)", r"notice", r"informed", r"advised"],
    },
    TriggerSpec {
        event_type: EventType::Payment,
        strength: 0.2,
        patterns: &[r"paid", r"payments?", r"remitted", r"invoiced?", r"wired"],
    },
    TriggerSpec {
        event_type: EventType::Regulatory,
        strength: 0.2,
        patterns: &[
            r"regulat(?:or|ors|ory|ion)",
            r"compliance",
            r"audit(?:ed)?",
            r"inspection",
            r"enforcement\s+action",
        ],
    },
    TriggerSpec {
        event_type: EventType::Corporate,
        strength: 0.15,
        patterns: &[r"merger", r"board\s+of\s+directors", r"shareholders?", r"incorporated", r"dissolution"],
    },
    TriggerSpec {
        event_type: EventType::Employment,
        strength: 0.2,
        patterns: &[r"hired", r"employ(?:ed|ment)", r"terminated", r"fired", r"resigned", r"promoted"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_type_has_triggers() {
        for event_type in EventType::ALL {
            let has_entry = TRIGGERS.iter().any(|entry| entry.event_type == event_type);
            assert_eq!(has_entry, event_type != EventType::Unknown, "{}", event_type);
        }
    }

    #[test]
    fn strengths_are_bounded() {
        assert!(TRIGGERS
            .iter()
            .all(|entry| (0.1..=0.3).contains(&entry.strength) && !entry.patterns.is_empty()));
    }
}
