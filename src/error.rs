//! Error types for timeline invariants.
//!
//! Extraction and analysis never fail on noisy text; these errors only
//! surface when externally supplied data (for example an imported timeline)
//! breaks a structural invariant.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// An event's point date lies outside its own date range.
    #[error("event {event_id}: date {date} is outside its range {start}..={end}")]
    DateOutsideRange {
        event_id: String,
        date: NaiveDateTime,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Two events share the same id.
    #[error("duplicate event id {0}")]
    DuplicateId(String),

    /// A relation set references an id that is not on the timeline.
    #[error("event {event_id} references unknown event {missing}")]
    DanglingReference { event_id: String, missing: String },

    /// Dated events are not in chronological order.
    #[error("event {0} is out of chronological order")]
    OutOfOrder(String),
}

pub type TimelineResult<T> = Result<T, TimelineError>;
