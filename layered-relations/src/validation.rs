//! Structural checks on mapped relationships.
//!
//! Problems are collected as [`ValidationFinding`]s rather than raised, so a
//! noisy document still produces a network. Callers that need a clean network
//! use [`ValidationReport::into_result`].

use std::fmt;

use layered_timeline::{EventId, Timeline};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{EventRelationship, RelationshipKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// An endpoint id is not on the timeline
    UnknownEvent,
    /// A causal relationship whose target is dated before its source
    EffectBeforeCause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
    pub kind: FindingKind,
    pub relationship_id: String,
    pub event_ids: Vec<EventId>,
    pub message: String,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.relationship_id, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Treat any finding as an error.
    pub fn into_result(self) -> Result<(), RelationError> {
        if self.findings.is_empty() {
            Ok(())
        } else {
            Err(RelationError::Invalid(self.findings))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelationError {
    #[error("relationship network has {} validation finding(s)", .0.len())]
    Invalid(Vec<ValidationFinding>),
}

/// Check endpoints exist and causal relationships run forward in time.
pub fn validate_relationships(
    timeline: &Timeline,
    relationships: &[EventRelationship],
) -> ValidationReport {
    let mut findings = Vec::new();
    for relationship in relationships {
        let source = timeline.event(&relationship.source_id);
        let target = timeline.event(&relationship.target_id);

        for (id, found) in [
            (&relationship.source_id, source.is_some()),
            (&relationship.target_id, target.is_some()),
        ] {
            if !found {
                findings.push(ValidationFinding {
                    kind: FindingKind::UnknownEvent,
                    relationship_id: relationship.id.clone(),
                    event_ids: vec![id.clone()],
                    message: format!("unknown event {}", id),
                });
            }
        }

        if relationship.kind != RelationshipKind::Causal {
            continue;
        }
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        if let (Some(cause), Some(effect)) = (source.sort_date(), target.sort_date()) {
            if cause > effect {
                findings.push(ValidationFinding {
                    kind: FindingKind::EffectBeforeCause,
                    relationship_id: relationship.id.clone(),
                    event_ids: vec![source.id.clone(), target.id.clone()],
                    message: format!(
                        "cause dated {} is after effect dated {}",
                        cause, effect
                    ),
                });
            }
        }
    }

    if !findings.is_empty() {
        tracing::warn!(findings = findings.len(), "relationship validation findings");
    }
    ValidationReport { findings }
}
