use chrono::NaiveDate;
use layered_timeline::EventType;

use super::fixtures::{dated, day, ids, timeline};
use crate::{ChronologyAnalyzer, PatternType, TemporalPattern};

fn of_type(patterns: &[TemporalPattern], pattern_type: PatternType) -> Vec<&TemporalPattern> {
    patterns
        .iter()
        .filter(|p| p.pattern_type == pattern_type)
        .collect()
}

#[test]
fn litigation_sequence_matches_in_order() {
    let timeline = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("m1", EventType::Motion, day(10)),
        dated("m2", EventType::Motion, day(15)),
        dated("h", EventType::Hearing, day(30)),
        dated("o", EventType::Order, day(45)),
    ]);

    let patterns = ChronologyAnalyzer::new().detect_procedural_patterns(&timeline);
    assert_eq!(patterns.len(), 1);
    let litigation = &patterns[0];
    assert_eq!(litigation.pattern_type, PatternType::ProceduralSequence);
    assert_eq!(litigation.name, "litigation_filing");
    assert_eq!(litigation.confidence, 1.0);
    assert_eq!(ids(&litigation.event_ids), vec!["f", "m1", "h", "o"]);
    assert_eq!(
        litigation.description,
        "4 of 4 steps of litigation_filing (filing -> motion -> hearing -> order)"
    );
}

#[test]
fn partial_sequences_need_three_events() {
    let analyzer = ChronologyAnalyzer::new();

    let three = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("m", EventType::Motion, day(10)),
        dated("h", EventType::Hearing, day(30)),
    ]);
    let patterns = analyzer.detect_procedural_patterns(&three);
    assert_eq!(patterns.len(), 1);
    assert!((patterns[0].confidence - 0.75).abs() < 1e-9);

    let two = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("m", EventType::Motion, day(10)),
    ]);
    assert!(analyzer.detect_procedural_patterns(&two).is_empty());
}

#[test]
fn out_of_order_events_do_not_match() {
    let timeline = timeline(vec![
        dated("o", EventType::Order, day(0)),
        dated("h", EventType::Hearing, day(5)),
        dated("m", EventType::Motion, day(10)),
        dated("f", EventType::Filing, day(15)),
    ]);
    assert!(ChronologyAnalyzer::new()
        .detect_procedural_patterns(&timeline)
        .is_empty());
}

#[test]
fn weekly_recurrence() {
    let timeline = timeline(vec![
        dated("w1", EventType::Meeting, day(0)),
        dated("w2", EventType::Meeting, day(7)),
        dated("w3", EventType::Meeting, day(14)),
        dated("w4", EventType::Meeting, day(21)),
    ]);
    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline);
    assert_eq!(patterns.len(), 1, "{:#?}", patterns);
    let recurring = &patterns[0];
    assert_eq!(recurring.pattern_type, PatternType::Recurring);
    assert_eq!(recurring.name, "recurring_meeting");
    assert_eq!(recurring.frequency.as_deref(), Some("weekly"));
    assert_eq!(recurring.confidence, 1.0);
}

#[test]
fn recurrence_labels_and_irregular_intervals() {
    let analyzer = ChronologyAnalyzer::new();

    let fortnightly = timeline(vec![
        dated("a", EventType::Payment, day(0)),
        dated("b", EventType::Payment, day(14)),
        dated("c", EventType::Payment, day(28)),
    ]);
    let patterns = analyzer.detect_patterns(&fortnightly);
    let recurring = of_type(&patterns, PatternType::Recurring);
    assert_eq!(recurring.len(), 1);
    assert_eq!(recurring[0].frequency.as_deref(), Some("every 14 days"));

    let irregular = timeline(vec![
        dated("a", EventType::Payment, day(0)),
        dated("b", EventType::Payment, day(1)),
        dated("c", EventType::Payment, day(30)),
        dated("d", EventType::Payment, day(31)),
    ]);
    let patterns = analyzer.detect_patterns(&irregular);
    assert!(of_type(&patterns, PatternType::Recurring).is_empty());
}

#[test]
fn seasonal_month_flagged() {
    let at = |m: u32, d: u32| {
        NaiveDate::from_ymd_opt(2023, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let mut events = Vec::new();
    for (n, m) in [1, 2, 4, 5, 6, 7, 8].into_iter().enumerate() {
        events.push(dated(&format!("other{}", n), EventType::Notification, at(m, 15)));
    }
    for d in [2, 9, 16, 23, 30] {
        events.push(dated(&format!("march{}", d), EventType::Notification, at(3, d)));
    }
    events.sort_by_key(|e| e.date);

    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline(events));
    let seasonal = of_type(&patterns, PatternType::Seasonal);
    assert_eq!(seasonal.len(), 1);
    assert_eq!(seasonal[0].name, "seasonal_march");
    assert_eq!(seasonal[0].event_ids.len(), 5);
    // 12 events over 8 months: average 1.5
    assert!((seasonal[0].confidence - 0.7).abs() < 1e-9);
    assert_eq!(
        seasonal[0].description,
        "5 events in March against a monthly average of 1.5"
    );
}

#[test]
fn sparse_litigation_has_no_seasonal_months() {
    let at = |m: u32, d: u32| {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let timeline = timeline(vec![
        dated("filing", EventType::Filing, at(1, 10)),
        dated("motion", EventType::Motion, at(1, 25)),
        dated("hearing", EventType::Hearing, at(2, 15)),
        dated("order", EventType::Order, at(3, 1)),
        dated("discovery", EventType::Discovery, at(3, 20)),
        dated("settlement", EventType::Settlement, at(6, 5)),
        dated("trial", EventType::Trial, at(10, 1)),
    ]);
    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline);
    assert!(of_type(&patterns, PatternType::Seasonal).is_empty());
}

#[test]
fn single_event_month_is_never_seasonal() {
    let at = |m: u32| {
        NaiveDate::from_ymd_opt(2024, m, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let events = (1..=6)
        .map(|m| dated(&format!("e{}", m), EventType::Notification, at(m)))
        .collect();
    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline(events));
    assert!(of_type(&patterns, PatternType::Seasonal).is_empty());
}

#[test]
fn seasonal_needs_six_events() {
    let timeline = timeline(vec![
        dated("a", EventType::Notification, day(0)),
        dated("b", EventType::Notification, day(2)),
        dated("c", EventType::Notification, day(100)),
    ]);
    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline);
    assert!(of_type(&patterns, PatternType::Seasonal).is_empty());
}

#[test]
fn escalating_activity() {
    let events = [0, 30, 40, 55, 60, 70, 80, 90, 95, 100]
        .iter()
        .map(|&d| dated(&format!("n{}", d), EventType::Notification, day(d)))
        .collect();

    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline(events));
    let escalation = of_type(&patterns, PatternType::Escalation);
    assert_eq!(escalation.len(), 1);
    assert_eq!(escalation[0].confidence, 1.0);
    assert_eq!(
        escalation[0].description,
        "activity rises across the timeline (bucket counts [1, 2, 3, 4])"
    );
}

#[test]
fn flat_activity_is_not_escalation() {
    let events = [0, 7, 14, 21]
        .iter()
        .map(|&d| dated(&format!("n{}", d), EventType::Notification, day(d)))
        .collect();
    let patterns = ChronologyAnalyzer::new().detect_patterns(&timeline(events));
    assert!(of_type(&patterns, PatternType::Escalation).is_empty());
}

#[test]
fn batches_by_type_and_communication_category() {
    let analyzer = ChronologyAnalyzer::new();

    let same_type = timeline(vec![
        dated("c1", EventType::Communication, day(0)),
        dated("c2", EventType::Communication, day(2)),
        dated("c3", EventType::Communication, day(5)),
    ]);
    let patterns = analyzer.detect_patterns(&same_type);
    let batches = of_type(&patterns, PatternType::Batch);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].name, "batch_communication");

    let mixed = timeline(vec![
        dated("c", EventType::Communication, day(0)),
        dated("n", EventType::Notification, day(2)),
        dated("m", EventType::Meeting, day(4)),
        dated("x", EventType::Meeting, day(40)),
    ]);
    let patterns = analyzer.detect_patterns(&mixed);
    let batches = of_type(&patterns, PatternType::Batch);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].name, "batch_communications");
    assert_eq!(ids(&batches[0].event_ids), vec!["c", "n", "m"]);
}

#[test]
fn empty_timeline_has_no_patterns() {
    assert!(ChronologyAnalyzer::new()
        .detect_patterns(&timeline(Vec::new()))
        .is_empty());
}
