use chrono::{NaiveDate, NaiveDateTime, Weekday};
use layered_timeline::{ExpressionSource, Recurrence, TemporalExpression, TemporalKind, TimeRelation};

use crate::{TemporalParser, TemporalParserConfig};

/// Wednesday, 12 June 2024.
fn reference() -> NaiveDateTime {
    at(2024, 6, 12)
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn patterns_only() -> TemporalParser {
    TemporalParser::with_config(TemporalParserConfig::default().with_entity_pass(false))
}

fn render(found: &[TemporalExpression]) -> String {
    found
        .iter()
        .map(|e| {
            format!(
                "{} [{:?}/{:?} {:.1}] {}",
                e.text,
                e.kind,
                e.source,
                e.confidence,
                e.normalized
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn absolute_formats() {
    let found = patterns_only().parse(
        "Filed on 2024-03-15. Served 3/18/2024. Heard March 20th, 2024 at 2:30 pm. \
         Ordered on the 5th day of April, 2024. Paid in May 2024.",
        reference(),
    );
    insta::assert_snapshot!(render(&found), @r###"
    2024-03-15 [Absolute/Pattern 0.9] 2024-03-15 00:00:00
    3/18/2024 [Absolute/Pattern 0.9] 2024-03-18 00:00:00
    March 20th, 2024 at 2:30 pm [Absolute/Pattern 0.9] 2024-03-20 14:30:00
    5th day of April, 2024 [Absolute/Pattern 0.9] 2024-04-05 00:00:00
    May 2024 [Absolute/Pattern 0.9] 2024-05-01 00:00:00
    "###);
    assert!(found
        .iter()
        .all(|e| e.relation == Some(TimeRelation::Past)));
}

#[test]
fn iso_time_and_two_digit_years() {
    let found = patterns_only().parse("Entered 2024-01-09 16:45, amended 1/10/24.", reference());
    assert_eq!(found.len(), 2);
    assert_eq!(
        found[0].normalized,
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap().and_hms_opt(16, 45, 0)
    );
    assert_eq!(found[1].normalized, Some(at(2024, 1, 10)));
}

#[test]
fn invalid_calendar_dates_are_dropped() {
    let found = patterns_only().parse("On 2/30/2024 and 2024-13-01 nothing happened.", reference());
    assert!(found.is_empty(), "unexpected: {:?}", found);
}

#[test]
fn overlapping_matches_keep_longest_span() {
    let found = patterns_only().parse("Signed 15 March 2024.", reference());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "15 March 2024");
    assert_eq!(found[0].normalized, Some(at(2024, 3, 15)));
}

#[test]
fn modal_may_is_not_a_month() {
    let found = patterns_only().parse("The court may 2024 revisit this.", reference());
    assert!(found.is_empty(), "unexpected: {:?}", found);
}

#[test]
fn relative_dates_resolve_against_reference() {
    let found = patterns_only().parse(
        "Yesterday the clerk called. The hearing is next week. \
         The motion was filed last Friday, three days ago. Judgment comes in 2 months.",
        reference(),
    );
    let resolved: Vec<_> = found
        .iter()
        .map(|e| (e.text.as_str(), e.normalized, e.relation))
        .collect();
    assert_eq!(
        resolved,
        vec![
            ("Yesterday", Some(at(2024, 6, 11)), Some(TimeRelation::Past)),
            ("next week", Some(at(2024, 6, 17)), Some(TimeRelation::Future)),
            ("last Friday", Some(at(2024, 6, 7)), Some(TimeRelation::Past)),
            ("three days ago", Some(at(2024, 6, 9)), Some(TimeRelation::Past)),
            ("in 2 months", Some(at(2024, 8, 12)), Some(TimeRelation::Future)),
        ]
    );
    assert!(found.iter().all(|e| e.kind == TemporalKind::Relative));
    assert!(found.iter().all(|e| (e.confidence - 0.7).abs() < f64::EPSILON));

    let week = found[1].range.unwrap();
    assert_eq!(week.start, at(2024, 6, 17));
    assert_eq!(week.end.date(), NaiveDate::from_ymd_opt(2024, 6, 23).unwrap());
}

#[test]
fn this_month_is_present() {
    let found = patterns_only().parse("Payments resume this month.", reference());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].normalized, Some(at(2024, 6, 1)));
    assert_eq!(found[0].relation, Some(TimeRelation::Present));
}

#[test]
fn from_to_range_consumes_its_bounds() {
    let found = TemporalParser::new().parse(
        "The trial ran from March 4, 2024 to March 8, 2024.",
        reference(),
    );
    assert_eq!(found.len(), 1, "unexpected: {}", render(&found));
    let range = &found[0];
    assert_eq!(range.kind, TemporalKind::Range);
    assert_eq!(range.text, "from March 4, 2024 to March 8, 2024");
    assert_eq!(range.normalized, Some(at(2024, 3, 4)));
    assert_eq!(range.range.unwrap().end, at(2024, 3, 8));
    assert!((range.confidence - 0.8).abs() < f64::EPSILON);
}

#[test]
fn reversed_between_range_is_swapped() {
    let found = patterns_only().parse("Discovery occurred between 1/9/2024 and 1/2/2024.", reference());
    assert_eq!(found.len(), 1);
    let range = found[0].range.unwrap();
    assert_eq!(range.start, at(2024, 1, 2));
    assert_eq!(range.end, at(2024, 1, 9));
    assert_eq!(found[0].normalized, Some(range.start));
}

#[test]
fn mismatched_connectors_are_not_ranges() {
    let found = patterns_only().parse("between 1/2/2024 to 1/9/2024", reference());
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|e| e.kind == TemporalKind::Absolute));
}

#[test]
fn recurring_expressions_have_no_date() {
    let found = patterns_only().parse(
        "Status reports are due every Monday and payments monthly; \
         meetings happen each quarter and audits every 2 weeks.",
        reference(),
    );
    let cadences: Vec<_> = found.iter().map(|e| e.recurrence).collect();
    assert_eq!(
        cadences,
        vec![
            Some(Recurrence::OnWeekday(Weekday::Mon)),
            Some(Recurrence::Monthly),
            Some(Recurrence::Quarterly),
            Some(Recurrence::EveryDays(14)),
        ]
    );
    assert!(found
        .iter()
        .all(|e| e.kind == TemporalKind::Recurring && e.normalized.is_none() && e.relation.is_none()));
}

#[test]
fn oversized_recurrence_intervals_are_dropped() {
    let parser = patterns_only();
    assert!(parser
        .parse("The board meets every 4294967295 months.", reference())
        .is_empty());
    assert!(parser
        .parse("Reports are due every other 3000000000 days.", reference())
        .is_empty());

    let found = parser.parse("Reports are due every other 3 days.", reference());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].recurrence, Some(Recurrence::EveryDays(6)));
}

#[test]
fn entity_pass_fills_gaps() {
    let found = TemporalParser::new().parse(
        "The audit began in March and closed in Q3 2023; revenue peaked in 2019.",
        reference(),
    );
    insta::assert_snapshot!(render(&found), @r###"
    March [Absolute/Entity 0.6] 2024-03-01 00:00:00
    Q3 2023 [Absolute/Entity 0.6] 2023-07-01 00:00:00
    2023 [Absolute/Entity 0.4] 2023-01-01 00:00:00
    2019 [Absolute/Entity 0.4] 2019-01-01 00:00:00
    "###);
    let quarter = found[1].range.unwrap();
    assert_eq!(quarter.end.date(), NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
}

#[test]
fn entity_pass_skips_covered_spans() {
    let found = TemporalParser::new().parse("The filing in March 2024 was late.", reference());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source, ExpressionSource::Pattern);
    assert_eq!(found[0].text, "March 2024");
}

#[test]
fn output_is_sorted_by_offset() {
    let found = TemporalParser::new().parse(
        "Every Monday since 2019 the parties met; on 2024-02-01 they settled, and tomorrow they pay.",
        reference(),
    );
    assert!(found.windows(2).all(|w| w[0].start <= w[1].start));
    assert_eq!(found.len(), 4);
}

#[test]
fn empty_text_yields_nothing() {
    assert!(TemporalParser::new().parse("", reference()).is_empty());
}

#[test]
fn parser_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TemporalParser>();
}
