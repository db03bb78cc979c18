use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use layered_timeline::{DomainRules, EventId, EventType, Timeline, TimelineError, TimelineEvent};

use crate::export::{self, event_rows, import_report, import_timeline, to_csv, write_csv};
use crate::{ChronologyReport, DocumentInput, Format, Pipeline, PipelineError};

const CASE: &str = "The hearing was held on 2024-04-02. \
                    Plaintiff Acme Corp filed the complaint on 2024-01-15. \
                    The court granted the order on 2024-05-20. \
                    A status meeting is held every Monday.";

fn at(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn report() -> ChronologyReport {
    Pipeline::standard().run(
        &DocumentInput::new(CASE)
            .with_document_id("case-9")
            .with_reference(at(6, 12)),
    )
}

fn ledger() -> Timeline {
    let mut payment = TimelineEvent::new(
        EventId::new("e1"),
        EventType::Payment,
        "Paid $5,000 \"in full\"",
    )
    .with_date(at(3, 1))
    .with_confidence(0.9)
    .with_participants(["Acme Corp", "Smith"]);
    payment.amount = Some("$5,000".to_string());
    payment.tags = vec!["payment".to_string()];
    let meeting = TimelineEvent::new(EventId::new("e2"), EventType::Meeting, "Status meeting");
    Timeline::from_events(vec![payment, meeting], &DomainRules::default())
}

#[test]
fn timeline_round_trips() {
    let timeline = report().timeline;
    for format in [Format::Json, Format::Ron] {
        let text = format.encode(&timeline).unwrap();
        let imported = import_timeline(&text, format).unwrap();

        assert_eq!(imported.len(), timeline.len());
        for (a, b) in imported.events.iter().zip(&timeline.events) {
            assert_eq!(a.event_type, b.event_type);
            assert_eq!(a.date, b.date);
            assert_eq!(a.confidence, b.confidence);
        }
        assert_eq!(imported, timeline);
    }
}

#[test]
fn report_round_trips() {
    let report = report();
    for format in [Format::Json, Format::Ron] {
        let text = format.encode(&report).unwrap();
        assert_eq!(text, format.encode(&report).unwrap());
        assert_eq!(import_report(&text, format).unwrap(), report);
    }
}

#[test]
fn json_field_names() {
    let json: serde_json::Value =
        serde_json::from_str(&Format::Json.encode(&report()).unwrap()).unwrap();
    assert_eq!(json["documentId"], "case-9");
    assert!(json["timeline"]["events"][0]["causedBy"].is_array());
    assert!(json["insights"]["confidenceScore"].is_number());
    assert!(json["network"]["eventRelationships"].is_array());
}

#[test]
fn import_validates_timelines() {
    let duplicate = Timeline::from_events(
        vec![
            TimelineEvent::new(EventId::new("x"), EventType::Filing, "first"),
            TimelineEvent::new(EventId::new("x"), EventType::Order, "second"),
        ],
        &DomainRules::default(),
    );
    let text = Format::Json.encode(&duplicate).unwrap();
    let error = import_timeline(&text, Format::Json).unwrap_err();
    assert!(matches!(
        error,
        PipelineError::Timeline(TimelineError::DuplicateId(ref id)) if id == "x"
    ));

    let error = import_timeline("{ not json", Format::Json).unwrap_err();
    assert!(matches!(error, PipelineError::Json(_)));
    let error = import_timeline("(events: [", Format::Ron).unwrap_err();
    assert!(matches!(error, PipelineError::RonParse(_)));
}

#[test]
fn relationship_findings_fail_validation() {
    let mut report = report();
    assert!(report.ensure_valid().is_ok());

    let network = report.network.as_mut().unwrap();
    network.validation.findings.push(layered_relations::ValidationFinding {
        kind: layered_relations::FindingKind::UnknownEvent,
        relationship_id: "ghost->x:causal".to_string(),
        event_ids: vec![EventId::new("ghost")],
        message: "unknown event ghost".to_string(),
    });
    let error = report.ensure_valid().unwrap_err();
    assert!(matches!(error, PipelineError::Relations(_)));
    assert_eq!(error.to_string(), "relationship network has 1 validation finding(s)");
}

#[test]
fn formats_from_extensions() {
    assert_eq!(Format::from_path(Path::new("out/report.json")), Some(Format::Json));
    assert_eq!(Format::from_path(Path::new("report.RON")), Some(Format::Ron));
    assert_eq!(Format::from_path(Path::new("report.csv")), None);
    assert_eq!(Format::from_path(Path::new("report")), None);
}

#[test]
fn save_and_load_files() {
    let dir = tempfile::tempdir().unwrap();
    let report = report();

    let ron_path = dir.path().join("report.ron");
    export::save(&report, &ron_path).unwrap();
    assert_eq!(export::load_report(&ron_path).unwrap(), report);

    let json_path = dir.path().join("timeline.json");
    export::save(&report.timeline, &json_path).unwrap();
    assert_eq!(export::load_timeline(&json_path).unwrap(), report.timeline);

    let error = export::save(&report, dir.path().join("report.txt")).unwrap_err();
    assert!(matches!(error, PipelineError::Io(_)));
}

#[test]
fn event_rows_flatten_events() {
    let rows = event_rows(&ledger());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].participants, "Acme Corp; Smith");
    assert_eq!(rows[0].date, "2024-03-01T00:00:00");
    assert_eq!(rows[1].date, "");
    assert_eq!(rows[1].amount, "");

    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["type"], "payment");
}

#[test]
fn csv_quoting() {
    let csv = to_csv(&ledger());
    assert!(csv.ends_with("\r\n"));
    assert_eq!(csv.matches("\r\n").count(), 3);
    insta::assert_snapshot!(csv.replace("\r\n", "\n"), @r###"
    id,type,description,date,certainty,confidence,participants,location,amount,tags
    e1,payment,"Paid $5,000 ""in full""",2024-03-01T00:00:00,uncertain,0.90,Acme Corp; Smith,,"$5,000",payment
    e2,meeting,Status meeting,,uncertain,0.50,,,,
    "###);

    let mut written = Vec::new();
    write_csv(&ledger(), &mut written).unwrap();
    assert_eq!(String::from_utf8(written).unwrap(), csv);
}
