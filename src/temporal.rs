//! Temporal expression types shared by the parser and the event extractor.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// An inclusive span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Create a range; reversed bounds are swapped.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whole days between start and end.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// The surface form a temporal expression was recognized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    /// "March 3, 2024", "2024-03-03"
    Absolute,
    /// "yesterday", "next week", "three days ago"
    Relative,
    /// "from March 1 to March 5, 2024"
    Range,
    /// "every Monday", "monthly"
    Recurring,
}

/// Which extraction pass produced an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionSource {
    /// Primary date/relative/range/recurring patterns
    Pattern,
    /// Secondary, lower-confidence entity pass (bare months, years, quarters)
    Entity,
}

/// Position of an expression relative to the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRelation {
    Past,
    Present,
    Future,
}

/// Cadence of a recurring expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
    OnWeekday(Weekday),
    EveryDays(u32),
}

/// A date, date range or recurrence found in raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalExpression {
    /// Raw text of the expression
    pub text: String,
    /// Resolved point in time, when one exists
    pub normalized: Option<NaiveDateTime>,
    /// Resolved span, for ranges and quarter references
    pub range: Option<DateRange>,
    pub kind: TemporalKind,
    pub recurrence: Option<Recurrence>,
    /// `None` for recurring expressions
    pub relation: Option<TimeRelation>,
    pub source: ExpressionSource,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl TemporalExpression {
    /// Midpoint of the span, used for nearest-expression lookups.
    pub fn center(&self) -> usize {
        self.start + (self.end - self.start) / 2
    }

    pub fn is_within(&self, start: usize, end: usize) -> bool {
        self.start >= start && self.end <= end
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }

    /// The instant this expression pins an event to, if any.
    pub fn anchor(&self) -> Option<NaiveDateTime> {
        self.normalized.or_else(|| self.range.map(|r| r.start))
    }
}
