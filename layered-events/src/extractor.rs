//! Sentence-level event extraction.
//!
//! [`EventExtractor`] scans each sentence for trigger phrases from the
//! trigger table. Every event type matched in a sentence yields one
//! [`TimelineEvent`], enriched with:
//!
//! - **Certainty** from indicator phrase classes ("if", "scheduled", "may", "likely", "was filed")
//! - **Date** from the temporal expression nearest the trigger
//! - **Participants** from role labels ("Plaintiff Acme Corp") and capitalized names
//! - **Amount**, **location** and **reference number** when present

use std::ops::Range;

use layered_timeline::{
    split_sentences, truncate_chars, EventCertainty, EventId, EventType, Sentence, SourceSpan,
    TemporalContext, TemporalExpression, TemporalKind, TimeRelation, TimelineEvent,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::triggers::TRIGGERS;

/// Tunable knobs for event extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Document id used when the caller supplies none
    pub default_document_id: String,
    pub max_participants: usize,
    pub max_description_chars: usize,
    pub base_confidence: f64,
    /// Added when a temporal expression is attached
    pub expression_bonus: f64,
    /// Multiplier applied to the attached expression's own confidence
    pub expression_weight: f64,
    /// Added when the sentence contains an explicit numeric date
    pub numeric_date_bonus: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_document_id: "document".to_string(),
            max_participants: 5,
            max_description_chars: 300,
            base_confidence: 0.5,
            expression_bonus: 0.2,
            expression_weight: 0.1,
            numeric_date_bonus: 0.1,
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_participants(mut self, max: usize) -> Self {
        self.max_participants = max;
        self
    }

    pub fn with_default_document_id(mut self, id: impl Into<String>) -> Self {
        self.default_document_id = id.into();
        self
    }
}

/// A compiled trigger alternation for one event type.
#[derive(Debug, Clone)]
struct Trigger {
    event_type: EventType,
    strength: f64,
    pattern: Regex,
}

/// Words that never start or belong to a participant name.
const NAME_NOISE: &[&str] = &[
    "The", "A", "An", "This", "That", "These", "Those", "On", "In", "At", "By", "For", "From",
    "To", "Of", "And", "But", "Or", "After", "Before", "During", "Upon", "Following", "Under",
    "When", "While", "If", "Unless", "It", "He", "She", "They", "We", "Plaintiff", "Plaintiffs",
    "Defendant", "Defendants", "Petitioner", "Petitioners", "Respondent", "Respondents",
    "Appellant", "Appellants", "Appellee", "Appellees", "Case", "Docket", "No", "Civil",
    "Action", "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December", "Monday", "Tuesday", "Wednesday",
    "Thursday", "Friday", "Saturday", "Sunday", "Court", "Courts", "County", "District", "Circuit",
    "Division", "Tribunal", "Courthouse",
];

/// Extracts typed timeline events from document text.
///
/// Regexes are compiled once on construction; the extractor is immutable and
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    config: ExtractorConfig,
    triggers: Vec<Trigger>,
    conditional: Regex,
    scheduled: Regex,
    possible: Regex,
    probable: Regex,
    definite: Regex,
    role_name: Regex,
    capitalized_run: Regex,
    amount: Regex,
    location: Regex,
    reference_number: Regex,
    numeric_date: Regex,
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EventExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        let triggers = TRIGGERS
            .iter()
            .map(|entry| Trigger {
                event_type: entry.event_type,
                strength: entry.strength,
                pattern: Regex::new(&format!(r"(?i)\b(?:{})\b", entry.patterns.join("|")))
                    .expect("Invalid trigger regex"),
            })
            .collect();

        let conditional = Regex::new(r"(?i)\b(?:if|unless|provided\s+that|in\s+the\s+event)\b")
            .expect("Invalid conditional regex");
        let scheduled = Regex::new(
            r"(?i)\b(?:scheduled|planned|set\s+for|will\s+be\s+held|calendared)\b",
        )
        .expect("Invalid scheduled regex");
        // lowercase "may" only, so the month name does not read as a hedge
        let possible = Regex::new(
            r"\b(?:(?i:might|could|possibly|allegedly|potentially|purportedly)|may)\b",
        )
        .expect("Invalid possible regex");
        let probable = Regex::new(r"(?i)\b(?:likely|probably|expected|anticipated)\b")
            .expect("Invalid probable regex");
        let definite = Regex::new(
            r"(?i)\b(?:was|were|has\s+been|have\s+been|had\s+been|did|filed|signed|granted|denied|entered|executed|issued|paid|held|occurred|served)\b",
        )
        .expect("Invalid definite regex");

        let role_name = Regex::new(
            r"\b(?:Plaintiff|Defendant|Petitioner|Respondent|Appellant|Appellee)s?\s+([A-Z][A-Za-z&'.-]*(?:\s+[A-Z][A-Za-z&'.-]*)*)",
        )
        .expect("Invalid role name regex");
        let capitalized_run = Regex::new(r"\b[A-Z][A-Za-z&'.-]*(?:\s+[A-Z][A-Za-z&'.-]*)+")
            .expect("Invalid capitalized name regex");

        let amount = Regex::new(
            r"(?i)\$\s?\d[\d,]*(?:\.\d+)?(?:\s+(?:thousand|million|billion))?|\b\d[\d,]*(?:\.\d+)?\s+(?:USD|dollars)\b",
        )
        .expect("Invalid amount regex");
        let location = Regex::new(
            r"\b(?:in|at|before)\s+the\s+((?:[A-Z][\w.'-]*\s+)*(?:Court|County|District|Circuit|Division|Tribunal|Courthouse)\b(?:\s+(?:of|for)\s+(?:the\s+)?[A-Z][\w.'-]*(?:\s+[A-Z][\w.'-]*)*)?)",
        )
        .expect("Invalid location regex");
        let reference_number = Regex::new(
            r"(?i)\b(?:Case|Docket|Civil\s+Action)\s+(?:No\.?|Number|#)\s*([A-Z0-9][A-Z0-9:./-]*[A-Z0-9])",
        )
        .expect("Invalid reference number regex");
        let numeric_date = Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b")
            .expect("Invalid numeric date regex");

        Self {
            config,
            triggers,
            conditional,
            scheduled,
            possible,
            probable,
            definite,
            role_name,
            capitalized_run,
            amount,
            location,
            reference_number,
            numeric_date,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract events from `text`.
    ///
    /// `expressions` are the temporal expressions found in the same text
    /// (offsets are byte offsets into `text`).
    pub fn extract_events(
        &self,
        text: &str,
        expressions: &[TemporalExpression],
        document_id: Option<&str>,
    ) -> Vec<TimelineEvent> {
        let document_id = document_id.unwrap_or(&self.config.default_document_id);
        let mut events = Vec::new();

        for sentence in split_sentences(text) {
            for trigger in &self.triggers {
                let Some(found) = trigger.pattern.find(sentence.text) else {
                    continue;
                };
                let event = self.build_event(
                    &sentence,
                    trigger,
                    sentence.start + found.start(),
                    expressions,
                    document_id,
                );
                tracing::trace!(
                    id = %event.id,
                    trigger = found.as_str(),
                    confidence = event.confidence,
                    "extracted event"
                );
                events.push(event);
            }
        }

        tracing::debug!(document = document_id, events = events.len(), "extracted events");
        events
    }

    fn build_event(
        &self,
        sentence: &Sentence<'_>,
        trigger: &Trigger,
        trigger_offset: usize,
        expressions: &[TemporalExpression],
        document_id: &str,
    ) -> TimelineEvent {
        let expression = nearest_expression(expressions, sentence, trigger_offset);
        let location_match = self
            .location
            .captures(sentence.text)
            .and_then(|caps| caps.get(1));
        let participants = self.participants(
            sentence.text,
            location_match.map(|m| m.start()..m.end()),
        );
        let amount = self.amount.find(sentence.text).map(|m| m.as_str().to_string());
        let location =
            location_match.map(|m| m.as_str().trim_end_matches(['.', ',']).to_string());
        let reference_number = self
            .reference_number
            .captures(sentence.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let mut event = TimelineEvent::new(
            EventId::derive(document_id, sentence.start, trigger.event_type),
            trigger.event_type,
            truncate_chars(sentence.text, self.config.max_description_chars),
        )
        .with_certainty(self.certainty(sentence.text))
        .with_participants(participants)
        .with_confidence(self.confidence(sentence.text, trigger, expression));

        event.temporal_context = temporal_context(trigger.event_type, expression);
        if let Some(expression) = expression {
            match (expression.kind, expression.range) {
                (TemporalKind::Range, Some(range)) => {
                    event.date_range = Some(range);
                    event.date = Some(range.start);
                }
                (TemporalKind::Recurring, _) => {}
                _ => event.date = expression.anchor(),
            }
        }
        event.source = SourceSpan {
            document_id: Some(document_id.to_string()),
            sentence: sentence.text.to_string(),
            start: sentence.start,
            end: sentence.end,
        };
        event.amount = amount;
        event.location = location;
        event.reference_number = reference_number;
        event.tags = tags(&event);
        event
    }

    /// First matching indicator class wins.
    fn certainty(&self, sentence: &str) -> EventCertainty {
        if self.conditional.is_match(sentence) {
            EventCertainty::Conditional
        } else if self.scheduled.is_match(sentence) {
            EventCertainty::Scheduled
        } else if self.possible.is_match(sentence) {
            EventCertainty::Possible
        } else if self.probable.is_match(sentence) {
            EventCertainty::Probable
        } else if self.definite.is_match(sentence) {
            EventCertainty::Certain
        } else {
            EventCertainty::Uncertain
        }
    }

    fn confidence(
        &self,
        sentence: &str,
        trigger: &Trigger,
        expression: Option<&TemporalExpression>,
    ) -> f64 {
        let mut confidence = self.config.base_confidence + trigger.strength;
        if let Some(expression) = expression {
            confidence +=
                self.config.expression_bonus + self.config.expression_weight * expression.confidence;
        }
        if self.numeric_date.is_match(sentence) {
            confidence += self.config.numeric_date_bonus;
        }
        confidence.min(1.0)
    }

    /// Role-labelled names and multi-word capitalized names, in order of
    /// appearance, deduplicated and capped. Names inside `location` are places.
    fn participants(&self, sentence: &str, location: Option<Range<usize>>) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();

        for caps in self.role_name.captures_iter(sentence) {
            // a role label makes a single capitalized word a name
            let first = caps
                .get(1)
                .and_then(|name| name_segments(name.as_str(), 1).into_iter().next().map(|s| (name.start(), s)));
            if let Some((start, (offset, segment))) = first {
                found.push((start + offset, segment));
            }
        }
        for run in self.capitalized_run.find_iter(sentence) {
            for (offset, segment) in name_segments(run.as_str(), 2) {
                found.push((run.start() + offset, segment));
            }
        }

        if let Some(location) = location {
            found.retain(|(position, _)| !location.contains(position));
        }
        found.sort_by_key(|(position, _)| *position);
        let mut names: Vec<String> = Vec::new();
        for (_, name) in found {
            if names.len() >= self.config.max_participants {
                break;
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Split a capitalized run at noise words, keeping runs of at least `min_words`.
///
/// Returns each kept name with its byte offset inside `run`.
fn name_segments(run: &str, min_words: usize) -> Vec<(usize, String)> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_start = 0;

    let mut flush = |current: &mut Vec<&str>, start: usize| {
        if !current.is_empty() && current.len() >= min_words {
            segments.push((start, current.join(" ")));
        }
        current.clear();
    };

    for (offset, word) in word_offsets(run) {
        let bare = word.trim_end_matches(['.', ',', '\'']);
        if bare.is_empty() || NAME_NOISE.contains(&bare) {
            flush(&mut current, current_start);
            continue;
        }
        if current.is_empty() {
            current_start = offset;
        }
        current.push(bare);
    }
    flush(&mut current, current_start);
    segments
}

fn word_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_whitespace().map(move |word| {
        let offset = word.as_ptr() as usize - text.as_ptr() as usize;
        (offset, word)
    })
}

/// The expression inside the sentence closest to the trigger; ties go to the
/// higher confidence, then to the earlier expression.
fn nearest_expression<'e>(
    expressions: &'e [TemporalExpression],
    sentence: &Sentence<'_>,
    trigger_offset: usize,
) -> Option<&'e TemporalExpression> {
    let mut best: Option<(&TemporalExpression, usize)> = None;
    for expression in expressions
        .iter()
        .filter(|e| e.is_within(sentence.start, sentence.end))
    {
        let distance = expression.center().abs_diff(trigger_offset);
        let better = match best {
            None => true,
            Some((current, current_distance)) => {
                distance < current_distance
                    || (distance == current_distance && expression.confidence > current.confidence)
            }
        };
        if better {
            best = Some((expression, distance));
        }
    }
    best.map(|(expression, _)| expression)
}

fn temporal_context(
    event_type: EventType,
    expression: Option<&TemporalExpression>,
) -> TemporalContext {
    if event_type == EventType::Deadline {
        return TemporalContext::Deadline;
    }
    match expression {
        None => TemporalContext::Past,
        Some(e) => match (e.kind, e.relation) {
            (TemporalKind::Recurring, _) => TemporalContext::Recurring,
            (TemporalKind::Range, _) => TemporalContext::Duration,
            (_, Some(TimeRelation::Future)) => TemporalContext::Future,
            (_, Some(TimeRelation::Present)) => TemporalContext::Present,
            _ => TemporalContext::Past,
        },
    }
}

fn tags(event: &TimelineEvent) -> Vec<String> {
    let mut tags = vec![event.event_type.category().as_str().to_string()];
    if event.is_dated() {
        tags.push("dated".to_string());
    }
    if event.amount.is_some() {
        tags.push("has_amount".to_string());
    }
    if event.location.is_some() {
        tags.push("has_location".to_string());
    }
    if event.reference_number.is_some() {
        tags.push("has_reference".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_segments_split_on_noise() {
        let segments = name_segments("On March Acme Corp And Jane Q. Doe", 2);
        assert_eq!(
            segments,
            vec![(9, "Acme Corp".to_string()), (23, "Jane Q Doe".to_string())]
        );
    }

    #[test]
    fn single_words_are_not_names() {
        assert!(name_segments("The Court", 2).is_empty());
        assert_eq!(name_segments("Smith On Monday", 1), vec![(0, "Smith".to_string())]);
    }
}
