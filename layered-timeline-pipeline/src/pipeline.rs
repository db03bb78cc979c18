//! Stage wiring: parse, extract, assemble, analyze, map.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use layered_chronology::{AnalysisType, ChronologyAnalyzer, ChronologyInsights};
use layered_events::{EventExtractor, TimelineAssembler};
use layered_relations::{RelationshipMapper, RelationshipNetwork};
use layered_temporal::TemporalParser;
use layered_timeline::{TemporalExpression, Timeline};
use serde::{Deserialize, Serialize};

use crate::cache::ParseCache;
use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// One document to process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub text: String,
    #[serde(default)]
    pub document_id: Option<String>,
    /// Instant relative expressions resolve against; now (UTC) when absent
    #[serde(default)]
    pub reference: Option<NaiveDateTime>,
    /// Analyses to run; all when absent
    #[serde(default)]
    pub analyses: Option<BTreeSet<AnalysisType>>,
}

impl DocumentInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_analyses(mut self, analyses: impl IntoIterator<Item = AnalysisType>) -> Self {
        self.analyses = Some(analyses.into_iter().collect());
        self
    }
}

/// Everything the pipeline produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronologyReport {
    #[serde(default)]
    pub document_id: Option<String>,
    pub reference: NaiveDateTime,
    /// Temporal expressions found in the text
    pub expression_count: usize,
    pub timeline: Timeline,
    #[serde(default)]
    pub insights: Option<ChronologyInsights>,
    #[serde(default)]
    pub network: Option<RelationshipNetwork>,
}

impl ChronologyReport {
    /// Fail on timeline invariant violations or relationship validation findings.
    pub fn ensure_valid(&self) -> PipelineResult<()> {
        self.timeline.validate()?;
        if let Some(network) = &self.network {
            network.validation.clone().into_result()?;
        }
        Ok(())
    }
}

/// The configured chain of stages.
///
/// Every stage is immutable after construction, so one pipeline can process
/// many documents at once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    parser: TemporalParser,
    extractor: EventExtractor,
    assembler: TimelineAssembler,
    analyzer: Option<ChronologyAnalyzer>,
    mapper: Option<RelationshipMapper>,
    cache: Option<Arc<ParseCache>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    /// All stages with default settings.
    pub fn standard() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Extraction and assembly only; reports carry no insights or network.
    pub fn timeline_only() -> Self {
        Self::with_config(PipelineConfig::timeline_only())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let PipelineConfig {
            analyze,
            map_relationships,
            cache,
            parser,
            extractor,
            assembler,
            chronology,
            mapper,
            rules,
        } = config;

        Self {
            parser: TemporalParser::with_config(parser),
            extractor: EventExtractor::with_config(extractor),
            assembler: TimelineAssembler::new()
                .with_config(assembler)
                .with_rules(rules.clone()),
            analyzer: analyze.then(|| {
                ChronologyAnalyzer::new()
                    .with_config(chronology)
                    .with_rules(rules.clone())
            }),
            mapper: map_relationships.then(|| {
                RelationshipMapper::new()
                    .with_config(mapper)
                    .with_rules(rules)
            }),
            cache: cache.then(|| Arc::new(ParseCache::new())),
        }
    }

    /// Share `cache` with this pipeline, replacing any it had.
    pub fn with_cache(mut self, cache: Arc<ParseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ParseCache>> {
        self.cache.as_ref()
    }

    pub fn run(&self, input: &DocumentInput) -> ChronologyReport {
        let reference = input
            .reference
            .unwrap_or_else(|| Utc::now().naive_utc());
        let _span = tracing::debug_span!(
            "chronology_pipeline",
            document = input.document_id.as_deref().unwrap_or(""),
        )
        .entered();

        let expressions = self.expressions(&input.text, reference);
        let events =
            self.extractor
                .extract_events(&input.text, &expressions, input.document_id.as_deref());
        let timeline = self.assembler.assemble(events);

        let insights = self.analyzer.as_ref().map(|analyzer| match &input.analyses {
            Some(analyses) => analyzer.analyze(&timeline, analyses),
            None => analyzer.analyze_all(&timeline),
        });
        let network = self
            .mapper
            .as_ref()
            .map(|mapper| mapper.map(&timeline, insights.as_ref()));

        tracing::debug!(
            expressions = expressions.len(),
            events = timeline.len(),
            analyzed = insights.is_some(),
            mapped = network.is_some(),
            "document processed"
        );

        ChronologyReport {
            document_id: input.document_id.clone(),
            reference,
            expression_count: expressions.len(),
            timeline,
            insights,
            network,
        }
    }

    /// Process documents in parallel; reports come back in input order.
    pub fn run_batch(&self, inputs: &[DocumentInput]) -> Vec<ChronologyReport> {
        if inputs.is_empty() {
            return Vec::new();
        }
        let workers = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(inputs.len());
        let chunk_size = inputs.len().div_ceil(workers);
        tracing::debug!(documents = inputs.len(), workers, "batch started");

        std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || chunk.iter().map(|input| self.run(input)).collect::<Vec<_>>())
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    fn expressions(&self, text: &str, reference: NaiveDateTime) -> Arc<Vec<TemporalExpression>> {
        match &self.cache {
            Some(cache) => cache.get_or_parse(&self.parser, text, reference),
            None => Arc::new(self.parser.parse(text, reference)),
        }
    }
}
