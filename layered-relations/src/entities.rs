//! Participant co-occurrence relationships.

use std::collections::BTreeMap;

use layered_timeline::{Timeline, TimelineEvent};
use regex::Regex;

use crate::network::{EntityRelationLabel, EntityRelationship, RelationshipStrength};

/// Phrase classes that label a participant pair, in tie-break order.
#[derive(Debug, Clone)]
pub(crate) struct PhraseClasses {
    classes: Vec<(EntityRelationLabel, Regex)>,
}

impl Default for PhraseClasses {
    fn default() -> Self {
        let class = |label, pattern: &str| {
            (
                label,
                Regex::new(pattern).expect("Invalid entity phrase regex"),
            )
        };
        Self {
            classes: vec![
                class(
                    EntityRelationLabel::Adversarial,
                    r"(?i)\b(?:versus|vs?\.|against|sued|sues|suing|lawsuits?|disputes?|disputed|opposing)",
                ),
                class(
                    EntityRelationLabel::Representative,
                    r"(?i)\b(?:counsel|attorneys?|represent(?:s|ed|ing|ation)?|on behalf of|agent for|law firm)\b",
                ),
                class(
                    EntityRelationLabel::Authoritative,
                    r"(?i)\b(?:ordered|ruled|directed|sanctioned|compelled|granted|denied|judge|regulator)\b",
                ),
                class(
                    EntityRelationLabel::Contractual,
                    r"(?i)\b(?:agreements?|contract(?:s|ed)?|signed|executed|licensed?|lease[sd]?|parties to)\b",
                ),
            ],
        }
    }
}

impl PhraseClasses {
    /// The best-supported label and every distinct phrase matched.
    fn classify<'t>(&self, sentences: impl Iterator<Item = &'t str> + Clone) -> (EntityRelationLabel, Vec<String>) {
        let mut best: Option<(EntityRelationLabel, usize)> = None;
        let mut evidence: Vec<String> = Vec::new();
        for (label, pattern) in &self.classes {
            let mut hits = 0;
            for sentence in sentences.clone() {
                for found in pattern.find_iter(sentence) {
                    hits += 1;
                    let phrase = found.as_str().to_lowercase();
                    if !evidence.contains(&phrase) {
                        evidence.push(phrase);
                    }
                }
            }
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((*label, hits));
            }
        }
        let label = best.map_or(EntityRelationLabel::Collaborative, |(label, _)| label);
        (label, evidence)
    }
}

/// Every participant pair sharing at least one event, ordered by pair.
pub(crate) fn entity_relationships(
    timeline: &Timeline,
    phrases: &PhraseClasses,
) -> Vec<EntityRelationship> {
    let mut pairs: BTreeMap<(&str, &str), Vec<&TimelineEvent>> = BTreeMap::new();
    for event in &timeline.events {
        let mut names: Vec<&str> = event.participants.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        for (i, &a) in names.iter().enumerate() {
            for &b in &names[i + 1..] {
                pairs.entry((a, b)).or_default().push(event);
            }
        }
    }

    pairs
        .into_iter()
        .map(|((a, b), events)| {
            let sentences = events.iter().map(|e| supporting_text(e));
            let (label, evidence) = phrases.classify(sentences);
            let count = events.len();
            let strength = if count > 3 {
                RelationshipStrength::Strong
            } else if count > 1 {
                RelationshipStrength::Moderate
            } else {
                RelationshipStrength::Weak
            };
            tracing::trace!(a, b, count, ?label, "entity pair");
            EntityRelationship {
                entity_a: a.to_string(),
                entity_b: b.to_string(),
                event_ids: events.iter().map(|e| e.id.clone()).collect(),
                label,
                evidence,
                strength,
                confidence: (0.2 * count as f64).min(1.0),
                first_observed: events.iter().filter_map(|e| e.sort_date()).min(),
                last_observed: events.iter().filter_map(|e| e.sort_date()).max(),
            }
        })
        .collect()
}

fn supporting_text(event: &TimelineEvent) -> &str {
    if event.source.sentence.is_empty() {
        &event.description
    } else {
        &event.source.sentence
    }
}
