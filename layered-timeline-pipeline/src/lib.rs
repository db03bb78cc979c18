//! End-to-end legal chronology extraction.
//!
//! [`Pipeline`] chains the workspace stages for one document at a time:
//!
//! 1. [`TemporalParser`](layered_temporal::TemporalParser) - dates, ranges and recurrences
//! 2. [`EventExtractor`](layered_events::EventExtractor) - typed events from trigger sentences
//! 3. [`TimelineAssembler`](layered_events::TimelineAssembler) - deduplicated, ordered, linked timeline
//! 4. [`ChronologyAnalyzer`](layered_chronology::ChronologyAnalyzer) - patterns, gaps, conflicts, critical path
//! 5. [`RelationshipMapper`](layered_relations::RelationshipMapper) - event and entity relationship network
//!
//! Around it sit the I/O edges:
//!
//! - [`PipelineConfig`] - Every stage's settings and the domain tables, loadable from TOML
//! - [`ParseCache`] - Shares parsed expressions between runs over identical text
//! - [`export`] - JSON/RON export and validated import, plus CSV event rows
//!
//! ## Example
//!
//! ```ignore
//! use layered_timeline_pipeline::{DocumentInput, Pipeline};
//!
//! let report = Pipeline::standard().run(
//!     &DocumentInput::new("The complaint was filed on March 3, 2024.").with_document_id("case-1"),
//! );
//! println!("{} events", report.timeline.len());
//! ```

mod cache;
mod config;
mod error;
pub mod export;
mod pipeline;

pub use cache::ParseCache;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use export::{EventRow, Format};
pub use pipeline::{ChronologyReport, DocumentInput, Pipeline};
