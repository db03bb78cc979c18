//! Relationship networks over legal timelines.
//!
//! [`RelationshipMapper`] turns a [`Timeline`](layered_timeline::Timeline),
//! optionally enriched with [`ChronologyInsights`](layered_chronology::ChronologyInsights),
//! into a [`RelationshipNetwork`]:
//!
//! - [`EventRelationship`] - Typed, scored edges between events, tagged with how they were found
//! - [`EntityRelationship`] - Participant pairs labelled from the sentences they share
//! - [`NetworkMetrics`] - Density, average path length and clustering coefficient
//! - [`NetworkPattern`] / [`MissingRelationship`] - Structural observations about the network
//! - [`ValidationReport`] - Unknown endpoints and causal edges that run backwards in time
//!
//! ## Example
//!
//! ```ignore
//! use layered_relations::{RelationshipKind, RelationshipMapper};
//!
//! let network = RelationshipMapper::new().map(&timeline, Some(&insights));
//! for edge in network.relationships_of(RelationshipKind::Causal) {
//!     println!("{} ({:.2})", edge.id, edge.confidence);
//! }
//! ```

mod entities;
mod mapper;
mod network;
mod validation;

pub use mapper::{MapperConfig, RelationshipMapper};
pub use network::{
    DetectionMethod, EntityRelationLabel, EntityRelationship, EventRelationship,
    MissingRelationship, MissingRelationshipKind, NetworkMetrics, NetworkPattern,
    NetworkPatternKind, RelationshipKind, RelationshipNetwork, RelationshipStrength,
};
pub use validation::{
    validate_relationships, FindingKind, RelationError, ValidationFinding, ValidationReport,
};
