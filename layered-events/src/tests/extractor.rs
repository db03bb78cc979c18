use chrono::{NaiveDate, NaiveDateTime};
use layered_temporal::TemporalParser;
use layered_timeline::{EventCertainty, EventType, TemporalContext, TimelineEvent};

use crate::{EventExtractor, ExtractorConfig};

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

fn extract(text: &str) -> Vec<TimelineEvent> {
    let expressions = TemporalParser::new().parse(text, reference());
    EventExtractor::new().extract_events(text, &expressions, None)
}

fn types(events: &[TimelineEvent]) -> Vec<EventType> {
    events.iter().map(|e| e.event_type).collect()
}

#[test]
fn filing_with_parties_and_date() {
    let events =
        extract("Plaintiff Acme Corp filed a complaint against Defendant Smith on March 3, 2024.");
    assert_eq!(types(&events), vec![EventType::Filing]);

    let filing = &events[0];
    assert_eq!(filing.id.as_str(), "document-000000-filing");
    assert_eq!(filing.date, Some(at(2024, 3, 3)));
    assert_eq!(filing.certainty, EventCertainty::Certain);
    assert_eq!(filing.temporal_context, TemporalContext::Past);
    assert_eq!(filing.participants, vec!["Acme Corp", "Smith"]);
    assert_eq!(filing.confidence, 1.0);
    assert_eq!(filing.tags, vec!["litigation", "dated"]);
    assert_eq!(filing.source.document_id.as_deref(), Some("document"));
}

#[test]
fn events_per_sentence() {
    let events = extract(
        "Plaintiff Acme Corp filed a complaint against Defendant Smith on March 3, 2024. \
         The hearing was held on 2024-04-02.",
    );
    let rendered = events
        .iter()
        .map(|e| {
            format!(
                "{} {} {} [{}]",
                e.id,
                e.event_type.as_str(),
                e.date.map(|d| d.to_string()).unwrap_or_default(),
                e.participants.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r###"
    document-000000-filing filing 2024-03-03 00:00:00 [Acme Corp, Smith]
    document-000080-hearing hearing 2024-04-02 00:00:00 []
    "###);
}

#[test]
fn confidence_without_expression() {
    let events = extract("The parties exchanged correspondence.");
    assert_eq!(types(&events), vec![EventType::Communication]);
    assert!((events[0].confidence - 0.6).abs() < 1e-9);
    assert_eq!(events[0].certainty, EventCertainty::Uncertain);
    assert!(events[0].date.is_none());
    assert_eq!(events[0].tags, vec!["communication"]);
}

#[test]
fn confidence_with_numeric_date() {
    // 0.5 base + 0.1 trigger + 0.2 expression + 0.1 * 0.9 + 0.1 numeric date
    let events = extract("Acme emailed Jones on 2024-01-05.");
    assert_eq!(types(&events), vec![EventType::Communication]);
    assert!((events[0].confidence - 0.99).abs() < 1e-9);
}

#[test]
fn several_types_in_one_sentence() {
    let events = extract("The court granted the motion to dismiss at the hearing on 2024-02-10.");
    assert_eq!(
        types(&events),
        vec![EventType::Hearing, EventType::Motion, EventType::Order]
    );
    assert!(events.iter().all(|e| e.date == Some(at(2024, 2, 10))));
    let ids: std::collections::BTreeSet<_> = events.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn nearest_expression_wins() {
    let events = extract("Acme filed on 2024-01-05 and the court held a hearing 2024-03-01.");
    let filing = events.iter().find(|e| e.event_type == EventType::Filing).unwrap();
    let hearing = events.iter().find(|e| e.event_type == EventType::Hearing).unwrap();
    assert_eq!(filing.date, Some(at(2024, 1, 5)));
    assert_eq!(hearing.date, Some(at(2024, 3, 1)));
}

#[test]
fn certainty_classes() {
    let cases = [
        ("If the defendant fails to pay, a hearing will follow.", EventCertainty::Conditional),
        ("The trial is scheduled for 2024-09-01.", EventCertainty::Scheduled),
        ("Defendant allegedly breached the contract.", EventCertainty::Possible),
        ("A settlement is likely.", EventCertainty::Probable),
        ("On May 5, 2024 the motion was filed.", EventCertainty::Certain),
        ("The deposition of Jane Roe.", EventCertainty::Uncertain),
    ];
    for (text, expected) in cases {
        let events = extract(text);
        assert!(!events.is_empty(), "no events for {:?}", text);
        assert!(
            events.iter().all(|e| e.certainty == expected),
            "{:?}: {:?}",
            text,
            events.iter().map(|e| e.certainty).collect::<Vec<_>>()
        );
    }
}

#[test]
fn temporal_contexts() {
    let scheduled = extract("The trial is scheduled for 2024-09-01.");
    assert_eq!(scheduled[0].temporal_context, TemporalContext::Future);

    let deadline = extract("Responses are due by 2024-07-01.");
    assert_eq!(types(&deadline), vec![EventType::Deadline]);
    assert_eq!(deadline[0].temporal_context, TemporalContext::Deadline);

    let recurring = extract("A status meeting is held every Monday.");
    assert_eq!(types(&recurring), vec![EventType::Meeting]);
    assert_eq!(recurring[0].temporal_context, TemporalContext::Recurring);
    assert!(recurring[0].date.is_none());
}

#[test]
fn range_sets_date_and_range() {
    let events = extract("Discovery ran from 2024-01-02 to 2024-03-01.");
    assert_eq!(types(&events), vec![EventType::Discovery]);
    let discovery = &events[0];
    assert_eq!(discovery.temporal_context, TemporalContext::Duration);
    assert_eq!(discovery.date, Some(at(2024, 1, 2)));
    assert_eq!(discovery.date_range.unwrap().end, at(2024, 3, 1));
    assert!(discovery.check_dates().is_ok());
}

#[test]
fn amount_location_and_reference() {
    let events = extract(
        "Defendant paid $1,250,000.00 in the Superior Court of California, Docket Number 24-1234.",
    );
    assert_eq!(types(&events), vec![EventType::Payment]);
    let payment = &events[0];
    assert_eq!(payment.amount.as_deref(), Some("$1,250,000.00"));
    assert_eq!(payment.location.as_deref(), Some("Superior Court of California"));
    assert_eq!(payment.reference_number.as_deref(), Some("24-1234"));
    assert!(payment.participants.is_empty());
    assert_eq!(
        payment.tags,
        vec!["business", "has_amount", "has_location", "has_reference"]
    );
}

#[test]
fn courts_are_locations_not_participants() {
    let events = extract(
        "Plaintiff Acme Corp filed a complaint against Defendant Beta LLC in the United States District Court on March 3, 2024.",
    );
    assert_eq!(types(&events), vec![EventType::Filing]);
    assert_eq!(events[0].participants, vec!["Acme Corp", "Beta LLC"]);
    assert_eq!(events[0].location.as_deref(), Some("United States District Court"));

    let events = extract("The District Court granted the motion on May 20, 2024.");
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.participants.is_empty()));
}

#[test]
fn written_amounts() {
    let events = extract("The parties settled for $2 million.");
    assert_eq!(events[0].amount.as_deref(), Some("$2 million"));
    let events = extract("Acme paid 500 USD.");
    assert_eq!(events[0].amount.as_deref(), Some("500 USD"));
}

#[test]
fn participants_are_capped() {
    let events = extract(
        "Alpha One, Beta Two, Gamma Three, Delta Four, Epsilon Five and Zeta Six signed the agreement.",
    );
    assert_eq!(types(&events), vec![EventType::Contract]);
    assert_eq!(
        events[0].participants,
        vec!["Alpha One", "Beta Two", "Gamma Three", "Delta Four", "Epsilon Five"]
    );

    let narrow = EventExtractor::with_config(ExtractorConfig::default().with_max_participants(2));
    let text = "Alpha One and Beta Two and Gamma Three signed the agreement.";
    let events = narrow.extract_events(text, &[], None);
    assert_eq!(events[0].participants, vec!["Alpha One", "Beta Two"]);
}

#[test]
fn ids_use_document_and_sentence_offset() {
    let text = "The complaint was filed. A hearing was held.";
    let expressions = TemporalParser::new().parse(text, reference());
    let extractor = EventExtractor::new();
    let events = extractor.extract_events(text, &expressions, Some("case-7"));
    let ids: Vec<_> = events.iter().map(|e| e.id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["case-7-000000-filing", "case-7-000025-hearing"]);

    let again = extractor.extract_events(text, &expressions, Some("case-7"));
    assert_eq!(events, again);
}

#[test]
fn empty_text_has_no_events() {
    assert!(extract("").is_empty());
    assert!(extract("Nothing of note here.").is_empty());
}
