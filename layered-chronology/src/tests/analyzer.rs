use std::collections::BTreeSet;

use chrono::Duration;
use layered_timeline::{EventType, Timeline};

use super::fixtures::{dated, day, link, timeline, undated};
use crate::{AnalysisType, ChronologyAnalyzer, ChronologyInsights};

fn litigation() -> Timeline {
    let mut events = vec![
        dated("f", EventType::Filing, day(0)).with_participants(["Acme Corp", "Smith"]),
        dated("m", EventType::Motion, day(12)).with_participants(["Acme Corp"]),
        dated("h", EventType::Hearing, day(40)).with_participants(["Acme Corp", "Smith"]),
        dated("o", EventType::Order, day(45)).with_confidence(0.9),
        dated("t1", EventType::Trial, day(300)),
        dated("t2", EventType::Trial, day(300) + Duration::hours(3)),
        undated("n", EventType::Notification),
    ];
    link(&mut events, "f", "h");
    link(&mut events, "h", "o");
    timeline(events)
}

#[test]
fn analysis_is_idempotent() {
    let analyzer = ChronologyAnalyzer::new();
    let timeline = litigation();
    let first = analyzer.analyze_all(&timeline);
    let second = analyzer.analyze_all(&timeline);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn full_analysis() {
    let insights = ChronologyAnalyzer::new().analyze_all(&litigation());

    assert_eq!(insights.analyses, AnalysisType::all());
    assert_eq!(insights.patterns[0].name, "litigation_filing");
    assert_eq!(insights.patterns[0].confidence, 1.0);
    assert_eq!(insights.gaps.len(), 1);
    assert_eq!(insights.gaps[0].duration_days, 255);
    assert_eq!(
        insights
            .conflicts_of(crate::ConflictType::ImpossibleTiming)
            .len(),
        1
    );
    let path: Vec<_> = insights.critical_path.iter().map(|id| id.as_str()).collect();
    assert_eq!(path, vec!["f", "h", "o"]);
    assert_eq!(insights.statistics.total_events, 7);
    assert_eq!(insights.statistics.undated_events, 1);
    assert_eq!(insights.statistics.span_days, 300);
}

#[test]
fn only_requested_analyses_run() {
    let requested: BTreeSet<_> = [AnalysisType::Gaps].into_iter().collect();
    let insights = ChronologyAnalyzer::new().analyze(&litigation(), &requested);

    assert_eq!(insights.analyses, requested);
    assert_eq!(insights.gaps.len(), 1);
    assert!(insights.patterns.is_empty());
    assert!(insights.conflicts.is_empty());
    assert!(insights.critical_path.is_empty());
    assert!(!insights.milestones.is_empty());
}

#[test]
fn empty_timeline() {
    let insights = ChronologyAnalyzer::new().analyze_all(&timeline(Vec::new()));
    assert_eq!(
        insights,
        ChronologyInsights {
            analyses: AnalysisType::all(),
            ..ChronologyInsights::default()
        }
    );
}

#[test]
fn confidence_score_blend() {
    let timeline = timeline(vec![
        dated("a", EventType::Meeting, day(0)),
        dated("b", EventType::Meeting, day(3)),
    ]);
    let insights = ChronologyAnalyzer::new().analyze(&timeline, &BTreeSet::new());
    // 0.3 * 1.0 dated + 0.3 * 0.5 confidence + 0.2 * 0 patterns + 0.2 * 1.0 no conflicts
    assert!((insights.confidence_score - 0.65).abs() < 1e-9);
}

#[test]
fn recommendations() {
    let timeline = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("m", EventType::Motion, day(200)),
        undated("x", EventType::Meeting),
    ]);
    let insights = ChronologyAnalyzer::new().analyze_all(&timeline);
    insta::assert_snapshot!(insights.recommendations.join("\n"), @r###"
    Investigate the 200 day gap between f and m.
    33% of events are undated; add dates from the source documents to improve ordering.
    "###);
}

#[test]
fn serialized_names() {
    let insights = ChronologyAnalyzer::new().analyze_all(&litigation());
    let json = serde_json::to_value(&insights).unwrap();

    assert_eq!(json["patterns"][0]["patternType"], "PROCEDURAL_SEQUENCE");
    assert_eq!(json["gaps"][0]["significance"], "high");
    assert_eq!(json["gaps"][0]["durationDays"], 255);
    let timing = json["conflicts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["conflictType"] == "IMPOSSIBLE_TIMING")
        .unwrap();
    assert_eq!(timing["severity"], "high");
    assert!(json["analyses"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("critical_path")));
}
