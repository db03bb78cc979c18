use layered_timeline::EventType;

use super::fixtures::{day, event, id, timeline};
use crate::{
    validate_relationships, DetectionMethod, EventRelationship, FindingKind, RelationError,
    RelationshipKind,
};

fn relationship(source: &str, target: &str, kind: RelationshipKind) -> EventRelationship {
    EventRelationship::new(id(source), id(target), kind, 0.8, DetectionMethod::DirectLink)
}

fn reversed() -> layered_timeline::Timeline {
    timeline(vec![
        event("late", EventType::Filing, "complaint").with_date(day(10)),
        event("early", EventType::Hearing, "hearing").with_date(day(0)),
        event("loose", EventType::Meeting, "meeting"),
    ])
}

#[test]
fn clean_relationships() {
    let report = validate_relationships(
        &reversed(),
        &[
            relationship("early", "late", RelationshipKind::Causal),
            relationship("late", "early", RelationshipKind::Temporal),
            relationship("late", "loose", RelationshipKind::Causal),
        ],
    );
    assert!(report.is_valid());
    assert!(report.into_result().is_ok());
}

#[test]
fn effect_before_cause() {
    let report = validate_relationships(
        &reversed(),
        &[relationship("late", "early", RelationshipKind::Causal)],
    );
    assert_eq!(report.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.kind, FindingKind::EffectBeforeCause);
    assert_eq!(finding.event_ids, vec![id("late"), id("early")]);
    assert_eq!(finding.relationship_id, "late->early:causal");
}

#[test]
fn unknown_events() {
    let report = validate_relationships(
        &reversed(),
        &[
            relationship("ghost", "early", RelationshipKind::Supportive),
            relationship("late", "phantom", RelationshipKind::Causal),
        ],
    );
    let kinds: Vec<_> = report.findings.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::UnknownEvent, FindingKind::UnknownEvent]);
    assert_eq!(report.findings[0].to_string(), "ghost->early:supportive: unknown event ghost");

    let error = report.into_result().unwrap_err();
    assert_eq!(
        error.to_string(),
        "relationship network has 2 validation finding(s)"
    );
    assert!(matches!(error, RelationError::Invalid(findings) if findings.len() == 2));
}
