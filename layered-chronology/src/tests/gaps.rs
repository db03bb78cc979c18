use layered_timeline::EventType;

use super::fixtures::{dated, day, timeline, undated};
use crate::{ChronologyAnalyzer, ChronologyConfig, Significance};

#[test]
fn single_gap_between_dense_clusters() {
    let timeline = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("m", EventType::Motion, day(2)),
        dated("h", EventType::Hearing, day(5)),
        dated("o", EventType::Order, day(205)),
        dated("p", EventType::Payment, day(207)),
        dated("d", EventType::Deadline, day(209)),
    ]);

    let gaps = ChronologyAnalyzer::new().identify_gaps(&timeline);
    assert_eq!(gaps.len(), 1);
    let gap = &gaps[0];
    assert_eq!(gap.significance, Significance::High);
    assert_eq!(gap.duration_days, 200);
    assert_eq!(gap.start_event_id.as_str(), "h");
    assert_eq!(gap.end_event_id.as_str(), "o");
    assert_eq!(gap.start_date, day(5));
    assert_eq!(gap.end_date, day(205));
    assert!(gap.missing_event_types.is_empty());
}

#[test]
fn significance_tiers() {
    let timeline = timeline(vec![
        dated("a", EventType::Communication, day(0)),
        dated("b", EventType::Communication, day(30)),
        dated("c", EventType::Communication, day(61)),
        dated("d", EventType::Communication, day(152)),
        dated("e", EventType::Communication, day(333)),
    ]);
    let tiers: Vec<_> = ChronologyAnalyzer::new()
        .identify_gaps(&timeline)
        .into_iter()
        .map(|g| (g.duration_days, g.significance))
        .collect();
    assert_eq!(
        tiers,
        vec![
            (31, Significance::Low),
            (91, Significance::Medium),
            (181, Significance::High)
        ]
    );
}

#[test]
fn expected_steps_between_endpoints() {
    let timeline = timeline(vec![
        dated("f", EventType::Filing, day(0)),
        dated("t", EventType::Trial, day(100)),
    ]);
    let gaps = ChronologyAnalyzer::new().identify_gaps(&timeline);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].significance, Significance::Medium);
    assert_eq!(
        gaps[0].missing_event_types,
        vec![EventType::Discovery, EventType::Deposition]
    );
    assert_eq!(
        gaps[0].description,
        "100 days without recorded events between filing and trial"
    );
}

#[test]
fn threshold_is_configurable() {
    let timeline = timeline(vec![
        dated("a", EventType::Meeting, day(0)),
        dated("b", EventType::Meeting, day(20)),
    ]);
    assert!(ChronologyAnalyzer::new().identify_gaps(&timeline).is_empty());

    let strict = ChronologyAnalyzer::new()
        .with_config(ChronologyConfig::default().with_gap_threshold_days(10));
    assert_eq!(strict.identify_gaps(&timeline).len(), 1);
}

#[test]
fn undated_and_single_events_have_no_gaps() {
    let analyzer = ChronologyAnalyzer::new();
    let timeline = timeline(vec![
        dated("a", EventType::Meeting, day(0)),
        undated("b", EventType::Meeting),
        undated("c", EventType::Meeting),
    ]);
    assert!(analyzer.identify_gaps(&timeline).is_empty());
    assert!(analyzer.identify_gaps(&super::fixtures::timeline(Vec::new())).is_empty());
}
