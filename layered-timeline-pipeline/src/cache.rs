//! Content-addressed cache of parsed temporal expressions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use dashmap::DashMap;
use layered_temporal::{TemporalParser, TemporalParserConfig};
use layered_timeline::TemporalExpression;
use sha2::{Digest, Sha256};

/// Parsed expressions keyed by the SHA-256 of `(parser config, reference instant, text)`.
///
/// Each key is written at most once; concurrent callers asking for the same
/// text share one `Arc`. Pipelines with different parser settings can share
/// a cache without seeing each other's expressions.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: DashMap<String, Arc<Vec<TemporalExpression>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(config: &TemporalParserConfig, text: &str, reference: NaiveDateTime) -> String {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(config).unwrap_or_default());
        hasher.update([0u8]);
        hasher.update(reference.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cached expressions for `text`, parsing on first use.
    pub fn get_or_parse(
        &self,
        parser: &TemporalParser,
        text: &str,
        reference: NaiveDateTime,
    ) -> Arc<Vec<TemporalExpression>> {
        let key = Self::key(parser.config(), text, reference);
        if let Some(found) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(found.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let parsed = Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::new(parser.parse(text, reference)))
                .value(),
        );
        tracing::trace!(expressions = parsed.len(), "parse cache miss");
        parsed
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
