//! Event extraction and timeline assembly.
//!
//! ## Stages
//!
//! - [`EventExtractor`] - Turns sentences with trigger phrases into typed [`TimelineEvent`]s
//! - [`TimelineAssembler`] - Deduplicates, orders and links events into a [`Timeline`]
//!
//! Both stages are pure: the same text and expressions always produce the
//! same events (ids are derived from document, sentence offset and type).
//!
//! [`TimelineEvent`]: layered_timeline::TimelineEvent
//! [`Timeline`]: layered_timeline::Timeline

mod assembler;
mod extractor;
mod triggers;

pub use assembler::{AssemblerConfig, TimelineAssembler};
pub use extractor::{EventExtractor, ExtractorConfig};
