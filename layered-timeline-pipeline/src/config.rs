//! Pipeline configuration.
//!
//! Every section is optional in TOML; missing sections and fields fall back
//! to the stage defaults.
//!
//! ```toml
//! analyze = true
//! map_relationships = true
//!
//! [chronology]
//! gap_threshold_days = 45
//!
//! [[rules.sequences]]
//! name = "appeal"
//! steps = ["order", "filing", "hearing", "order"]
//! ```

use std::path::Path;

use layered_chronology::ChronologyConfig;
use layered_events::{AssemblerConfig, ExtractorConfig};
use layered_relations::MapperConfig;
use layered_temporal::TemporalParserConfig;
use layered_timeline::DomainRules;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the chronology analyzer after assembly
    pub analyze: bool,
    /// Map the relationship network (uses the insights when `analyze` is set)
    pub map_relationships: bool,
    /// Share parsed temporal expressions between runs of identical text
    pub cache: bool,
    pub parser: TemporalParserConfig,
    pub extractor: ExtractorConfig,
    pub assembler: AssemblerConfig,
    pub chronology: ChronologyConfig,
    pub mapper: MapperConfig,
    pub rules: DomainRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analyze: true,
            map_relationships: true,
            cache: false,
            parser: TemporalParserConfig::default(),
            extractor: ExtractorConfig::default(),
            assembler: AssemblerConfig::default(),
            chronology: ChronologyConfig::default(),
            mapper: MapperConfig::default(),
            rules: DomainRules::default(),
        }
    }
}

impl PipelineConfig {
    /// Extraction and assembly only.
    pub fn timeline_only() -> Self {
        Self {
            analyze: false,
            map_relationships: false,
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn with_rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "pipeline configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> PipelineResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reject settings no stage can work with.
    pub fn validate(&self) -> PipelineResult<()> {
        let chronology = &self.chronology;
        if chronology.gap_threshold_days <= 0 {
            return Err(invalid("chronology.gap_threshold_days must be positive"));
        }
        if chronology.medium_gap_days > chronology.high_gap_days {
            return Err(invalid(
                "chronology.medium_gap_days must not exceed chronology.high_gap_days",
            ));
        }
        if chronology.cluster_window_days <= 0 {
            return Err(invalid("chronology.cluster_window_days must be positive"));
        }
        if chronology.min_cluster_size < 2 {
            return Err(invalid("chronology.min_cluster_size must be at least 2"));
        }
        if chronology.max_causal_delay_days < 0 || chronology.conflict_tolerance_hours < 0 {
            return Err(invalid("chronology windows must not be negative"));
        }
        if self.assembler.concurrency_window_hours < 0 {
            return Err(invalid("assembler.concurrency_window_hours must not be negative"));
        }

        let mapper = &self.mapper;
        let thresholds = [
            mapper.similarity_threshold,
            mapper.moderate_similarity,
            mapper.strong_similarity,
        ];
        if thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(invalid("mapper similarity thresholds must lie in [0, 1]"));
        }
        if !(mapper.similarity_threshold <= mapper.moderate_similarity
            && mapper.moderate_similarity <= mapper.strong_similarity)
        {
            return Err(invalid(
                "mapper similarity thresholds must be ordered weak <= moderate <= strong",
            ));
        }

        for sequence in &self.rules.sequences {
            if sequence.name.trim().is_empty() {
                return Err(invalid("procedural sequences need a name"));
            }
            if sequence.steps.len() < 2 {
                return Err(PipelineError::Config(format!(
                    "procedural sequence {} needs at least two steps",
                    sequence.name
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> PipelineError {
    PipelineError::Config(message.to_string())
}
