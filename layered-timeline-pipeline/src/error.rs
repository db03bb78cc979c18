//! Errors at the pipeline's I/O edges.
//!
//! Running the pipeline on text never fails; only loading configuration and
//! moving data in and out of files or serialized formats can.

use layered_relations::RelationError;
use layered_timeline::TimelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// An imported timeline breaks a structural invariant.
    #[error("invalid timeline: {0}")]
    Timeline(#[from] TimelineError),

    /// A relationship network failed validation.
    #[error(transparent)]
    Relations(#[from] RelationError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
