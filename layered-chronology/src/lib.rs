//! Chronology analysis over assembled legal timelines.
//!
//! [`ChronologyAnalyzer`] runs a set of independent analyses over a
//! [`Timeline`](layered_timeline::Timeline) and gathers them into
//! [`ChronologyInsights`]:
//!
//! ## Analyses
//!
//! - **Patterns** - Procedural sequences, recurring, seasonal, escalating and batched events
//! - **Gaps** - Long silences between consecutive dated events, with expected missing steps
//! - **Clusters** - Temporal, same-type and shared-participant event groups
//! - **Causal** - Scored cause/effect candidates from the causal-pair table
//! - **Conflicts** - Sequence violations, impossible timings and effect-before-cause links
//! - **Critical path** - The longest causal chain, plus milestone events
//!
//! Each analysis is selected through [`AnalysisType`] and is also available as
//! its own method. Insufficient data yields empty results, never an error.
//!
//! ## Example
//!
//! ```ignore
//! use layered_chronology::{AnalysisType, ChronologyAnalyzer};
//!
//! let analyzer = ChronologyAnalyzer::new();
//! let insights = analyzer.analyze(&timeline, &AnalysisType::all());
//! for gap in insights.high_significance_gaps() {
//!     println!("{}", gap.description);
//! }
//! ```

mod analyzer;
mod causality;
mod clusters;
mod conflicts;
mod critical_path;
mod gaps;
mod insights;
mod patterns;

pub use analyzer::{ChronologyAnalyzer, ChronologyConfig};
pub use insights::{
    AnalysisType, CausalRelationship, ChronologyInsights, ChronologyStatistics, ClusterKind,
    ConflictType, EventCluster, PatternType, Severity, Significance, TemporalPattern,
    TimelineConflict, TimelineGap,
};
