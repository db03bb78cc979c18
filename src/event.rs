//! Timeline events and their closed classification enums.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::temporal::DateRange;
use crate::TimelineError;

/// Stable identifier of a [`TimelineEvent`].
///
/// Identifiers are derived from the source document, the sentence offset and
/// the event type, so re-running extraction on the same text yields the same
/// ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the canonical id for an event found at `sentence_start`.
    pub fn derive(document_id: &str, sentence_start: usize, event_type: EventType) -> Self {
        Self(format!(
            "{}-{:06}-{}",
            document_id,
            sentence_start,
            event_type.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The kind of legal or business event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Filing,
    Hearing,
    Motion,
    Order,
    Discovery,
    Deposition,
    Settlement,
    Trial,
    Contract,
    Deadline,
    Communication,
    Transaction,
    Incident,
    Meeting,
    Notification,
    Payment,
    Regulatory,
    Corporate,
    Employment,
    #[serde(other)]
    Unknown,
}

/// Coarse grouping of event types, used for tags and burst detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Litigation,
    Business,
    Communication,
    General,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Litigation => "litigation",
            EventCategory::Business => "business",
            EventCategory::Communication => "communication",
            EventCategory::General => "general",
        }
    }
}

impl EventType {
    /// Every variant, in declaration order.
    pub const ALL: [EventType; 20] = [
        EventType::Filing,
        EventType::Hearing,
        EventType::Motion,
        EventType::Order,
        EventType::Discovery,
        EventType::Deposition,
        EventType::Settlement,
        EventType::Trial,
        EventType::Contract,
        EventType::Deadline,
        EventType::Communication,
        EventType::Transaction,
        EventType::Incident,
        EventType::Meeting,
        EventType::Notification,
        EventType::Payment,
        EventType::Regulatory,
        EventType::Corporate,
        EventType::Employment,
        EventType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Filing => "filing",
            EventType::Hearing => "hearing",
            EventType::Motion => "motion",
            EventType::Order => "order",
            EventType::Discovery => "discovery",
            EventType::Deposition => "deposition",
            EventType::Settlement => "settlement",
            EventType::Trial => "trial",
            EventType::Contract => "contract",
            EventType::Deadline => "deadline",
            EventType::Communication => "communication",
            EventType::Transaction => "transaction",
            EventType::Incident => "incident",
            EventType::Meeting => "meeting",
            EventType::Notification => "notification",
            EventType::Payment => "payment",
            EventType::Regulatory => "regulatory",
            EventType::Corporate => "corporate",
            EventType::Employment => "employment",
            EventType::Unknown => "unknown",
        }
    }

    /// Parse the snake_case name; anything unrecognized is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .unwrap_or(EventType::Unknown)
    }

    pub fn category(&self) -> EventCategory {
        match self {
            EventType::Filing
            | EventType::Hearing
            | EventType::Motion
            | EventType::Order
            | EventType::Discovery
            | EventType::Deposition
            | EventType::Settlement
            | EventType::Trial => EventCategory::Litigation,
            EventType::Contract
            | EventType::Transaction
            | EventType::Payment
            | EventType::Regulatory
            | EventType::Corporate
            | EventType::Employment => EventCategory::Business,
            EventType::Communication | EventType::Notification | EventType::Meeting => {
                EventCategory::Communication
            }
            EventType::Deadline | EventType::Incident | EventType::Unknown => {
                EventCategory::General
            }
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure the source text is that an event happened (or will happen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCertainty {
    Certain,
    Probable,
    Possible,
    Scheduled,
    Conditional,
    Uncertain,
}

impl EventCertainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCertainty::Certain => "certain",
            EventCertainty::Probable => "probable",
            EventCertainty::Possible => "possible",
            EventCertainty::Scheduled => "scheduled",
            EventCertainty::Conditional => "conditional",
            EventCertainty::Uncertain => "uncertain",
        }
    }
}

/// Where the event sits in time relative to the document's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalContext {
    Past,
    Present,
    Future,
    Recurring,
    Duration,
    Deadline,
}

/// The sentence an event was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpan {
    #[serde(default)]
    pub document_id: Option<String>,
    pub sentence: String,
    /// Byte offset of the sentence start in the source text
    pub start: usize,
    /// Byte offset one past the sentence end
    pub end: usize,
}

/// A single dated (or undated) event on a legal timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: EventId,
    pub event_type: EventType,
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    pub certainty: EventCertainty,
    pub temporal_context: TemporalContext,
    pub confidence: f64,
    #[serde(default)]
    pub source: SourceSpan,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub caused_by: BTreeSet<EventId>,
    #[serde(default)]
    pub leads_to: BTreeSet<EventId>,
    #[serde(default)]
    pub concurrent_with: BTreeSet<EventId>,
}

impl TimelineEvent {
    /// Create an undated event with empty relation sets.
    pub fn new(id: EventId, event_type: EventType, description: impl Into<String>) -> Self {
        Self {
            id,
            event_type,
            description: description.into(),
            date: None,
            date_range: None,
            certainty: EventCertainty::Uncertain,
            temporal_context: TemporalContext::Past,
            confidence: 0.5,
            source: SourceSpan::default(),
            participants: Vec::new(),
            location: None,
            amount: None,
            reference_number: None,
            tags: Vec::new(),
            caused_by: BTreeSet::new(),
            leads_to: BTreeSet::new(),
            concurrent_with: BTreeSet::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_certainty(mut self, certainty: EventCertainty) -> Self {
        self.certainty = certainty;
        self
    }

    /// Append participants, keeping first-seen order and skipping duplicates.
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for participant in participants {
            let participant = participant.into();
            if !self.participants.contains(&participant) {
                self.participants.push(participant);
            }
        }
        self
    }

    /// The instant used for chronological ordering: the point date, or the
    /// start of the range when only a range is known.
    pub fn sort_date(&self) -> Option<NaiveDateTime> {
        self.date.or_else(|| self.date_range.map(|r| r.start))
    }

    pub fn is_dated(&self) -> bool {
        self.sort_date().is_some()
    }

    /// Latest instant covered by this event.
    pub fn end_date(&self) -> Option<NaiveDateTime> {
        match (self.date, self.date_range) {
            (_, Some(range)) => Some(range.end),
            (Some(date), None) => Some(date),
            (None, None) => None,
        }
    }

    /// Number of participants shared with `other`.
    pub fn shared_participants(&self, other: &TimelineEvent) -> usize {
        self.participants
            .iter()
            .filter(|p| other.participants.contains(p))
            .count()
    }

    /// Total number of relation links on this event.
    pub fn connection_count(&self) -> usize {
        self.caused_by.len() + self.leads_to.len() + self.concurrent_with.len()
    }

    /// Returns true if `other` is a direct cause or effect of this event.
    pub fn is_causally_linked(&self, other: &TimelineEvent) -> bool {
        self.caused_by.contains(&other.id)
            || self.leads_to.contains(&other.id)
            || other.caused_by.contains(&self.id)
            || other.leads_to.contains(&self.id)
    }

    /// Enforce the point-date-within-range invariant.
    pub fn check_dates(&self) -> Result<(), TimelineError> {
        if let (Some(date), Some(range)) = (self.date, self.date_range) {
            if !range.contains(date) {
                return Err(TimelineError::DateOutsideRange {
                    event_id: self.id.to_string(),
                    date,
                    start: range.start,
                    end: range.end,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn derived_ids_are_stable() {
        let id = EventId::derive("case-7", 42, EventType::Filing);
        assert_eq!(id.as_str(), "case-7-000042-filing");
        assert_eq!(id, EventId::derive("case-7", 42, EventType::Filing));
    }

    #[test]
    fn unknown_type_names_fall_back() {
        assert_eq!(EventType::from_name("Hearing"), EventType::Hearing);
        assert_eq!(EventType::from_name("arbitration"), EventType::Unknown);
        let parsed: EventType = serde_json::from_str("\"arbitration\"").unwrap();
        assert_eq!(parsed, EventType::Unknown);
    }

    #[test]
    fn categories() {
        assert_eq!(EventType::Trial.category(), EventCategory::Litigation);
        assert_eq!(EventType::Payment.category(), EventCategory::Business);
        assert_eq!(EventType::Meeting.category(), EventCategory::Communication);
        assert_eq!(EventType::Deadline.category(), EventCategory::General);
    }

    #[test]
    fn participants_are_deduplicated_in_order() {
        let event = TimelineEvent::new("e1".into(), EventType::Meeting, "met")
            .with_participants(["Acme Corp", "Jane Doe", "Acme Corp"]);
        assert_eq!(event.participants, vec!["Acme Corp", "Jane Doe"]);
    }

    #[test]
    fn date_must_fall_within_range() {
        let range = DateRange::new(at(2024, 1, 1), at(2024, 1, 31));
        let ok = TimelineEvent::new("e1".into(), EventType::Trial, "trial")
            .with_date(at(2024, 1, 15))
            .with_date_range(range);
        assert!(ok.check_dates().is_ok());

        let bad = ok.clone().with_date(at(2024, 2, 15));
        assert!(matches!(
            bad.check_dates(),
            Err(TimelineError::DateOutsideRange { .. })
        ));
    }

    #[test]
    fn sort_date_prefers_point_date() {
        let range = DateRange::new(at(2024, 3, 1), at(2024, 3, 10));
        let ranged = TimelineEvent::new("e1".into(), EventType::Trial, "trial").with_date_range(range);
        assert_eq!(ranged.sort_date(), Some(at(2024, 3, 1)));
        assert_eq!(ranged.end_date(), Some(at(2024, 3, 10)));

        let undated = TimelineEvent::new("e2".into(), EventType::Trial, "trial");
        assert!(!undated.is_dated());
    }
}
