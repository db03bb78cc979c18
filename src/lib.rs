#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Core data model for legal chronology extraction.
//!
//! Every stage of the timeline workspace exchanges the types defined here:
//!
//! ## Events
//!
//! - [`TimelineEvent`] - A classified event with optional date/range, certainty and relations
//! - [`EventType`] / [`EventCategory`] - Closed classification of legal and business events
//! - [`EventId`] - Deterministic identifier derived from document, sentence offset and type
//!
//! ## Time
//!
//! - [`TemporalExpression`] - A date, range or recurrence found in raw text
//! - [`DateRange`] - An inclusive span of time
//!
//! ## Timeline
//!
//! - [`Timeline`] - The chronologically ordered event list plus derived summaries
//! - [`Timeline::validate`] - Structural checks for externally supplied timelines
//!
//! ## Domain tables
//!
//! [`DomainRules`] holds the causal pairs, procedural sequence templates,
//! precedence requirements and mutually exclusive event pairs used by the
//! assembler, analyzer and relationship mapper. The defaults encode common
//! US civil litigation and contract workflows; callers may override any table.
//!
//! ## Example
//!
//! ```ignore
//! use layered_timeline::{DomainRules, EventId, EventType, Timeline, TimelineEvent};
//!
//! let filing = TimelineEvent::new(EventId::new("doc-1"), EventType::Filing, "Complaint filed");
//! let timeline = Timeline::from_events(vec![filing], &DomainRules::default());
//! assert!(timeline.validate().is_ok());
//! ```

mod error;
mod event;
mod rules;
mod temporal;
mod text;
mod timeline;

pub use error::{TimelineError, TimelineResult};
pub use event::{
    EventCategory, EventCertainty, EventId, EventType, SourceSpan, TemporalContext, TimelineEvent,
};
pub use rules::{CausalRule, DomainRules, PrecedenceRule, ProceduralSequence};
pub use temporal::{
    DateRange, ExpressionSource, Recurrence, TemporalExpression, TemporalKind, TimeRelation,
};
pub use text::{normalize_description, split_sentences, terms, truncate_chars, Sentence};
pub use timeline::{Timeline, TimelineStatistics};
