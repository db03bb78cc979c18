//! Serialized and tabular export, and validated import.
//!
//! JSON and RON output follow struct field order, so exporting the same value
//! twice yields identical text. Imported timelines are checked with
//! [`Timeline::validate`] before they are returned.

use std::io;
use std::path::Path;

use layered_timeline::{Timeline, TimelineEvent};
use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::ChronologyReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    Ron,
}

impl Format {
    /// Format implied by a `.json` or `.ron` extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "ron" => Some(Format::Ron),
            _ => None,
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> PipelineResult<String> {
        match self {
            Format::Json => Ok(serde_json::to_string_pretty(value)?),
            Format::Ron => Ok(ron::ser::to_string_pretty(value, PrettyConfig::default())?),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, text: &str) -> PipelineResult<T> {
        match self {
            Format::Json => Ok(serde_json::from_str(text)?),
            Format::Ron => Ok(ron::from_str(text)?),
        }
    }
}

// ============================================================================
// Import
// ============================================================================

pub fn import_timeline(text: &str, format: Format) -> PipelineResult<Timeline> {
    let timeline: Timeline = format.decode(text)?;
    timeline.validate()?;
    tracing::debug!(events = timeline.len(), ?format, "timeline imported");
    Ok(timeline)
}

pub fn import_report(text: &str, format: Format) -> PipelineResult<ChronologyReport> {
    let report: ChronologyReport = format.decode(text)?;
    report.timeline.validate()?;
    Ok(report)
}

/// Write `value` to `path` in the format its extension names.
pub fn save<T: Serialize>(value: &T, path: impl AsRef<Path>) -> PipelineResult<()> {
    let path = path.as_ref();
    let text = format_for(path)?.encode(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn load_timeline(path: impl AsRef<Path>) -> PipelineResult<Timeline> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    import_timeline(&text, format_for(path)?)
}

pub fn load_report(path: impl AsRef<Path>) -> PipelineResult<ChronologyReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    import_report(&text, format_for(path)?)
}

fn format_for(path: &Path) -> PipelineResult<Format> {
    Format::from_path(path).ok_or_else(|| {
        PipelineError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{}: expected a .json or .ron file", path.display()),
        ))
    })
}

// ============================================================================
// Tabular rows
// ============================================================================

/// One event flattened for spreadsheets. Empty strings stand in for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    pub date: String,
    pub certainty: String,
    pub confidence: f64,
    pub participants: String,
    pub location: String,
    pub amount: String,
    pub tags: String,
}

impl EventRow {
    pub const HEADER: [&'static str; 10] = [
        "id",
        "type",
        "description",
        "date",
        "certainty",
        "confidence",
        "participants",
        "location",
        "amount",
        "tags",
    ];

    fn fields(&self) -> [String; 10] {
        [
            self.id.clone(),
            self.event_type.clone(),
            self.description.clone(),
            self.date.clone(),
            self.certainty.clone(),
            format!("{:.2}", self.confidence),
            self.participants.clone(),
            self.location.clone(),
            self.amount.clone(),
            self.tags.clone(),
        ]
    }
}

impl From<&TimelineEvent> for EventRow {
    fn from(event: &TimelineEvent) -> Self {
        Self {
            id: event.id.to_string(),
            event_type: event.event_type.as_str().to_string(),
            description: event.description.clone(),
            date: event
                .sort_date()
                .map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_default(),
            certainty: event.certainty.as_str().to_string(),
            confidence: event.confidence,
            participants: event.participants.join("; "),
            location: event.location.clone().unwrap_or_default(),
            amount: event.amount.clone().unwrap_or_default(),
            tags: event.tags.join("; "),
        }
    }
}

pub fn event_rows(timeline: &Timeline) -> Vec<EventRow> {
    timeline.events.iter().map(EventRow::from).collect()
}

/// The timeline as CSV with a header row, CRLF line endings and RFC 4180 quoting.
pub fn to_csv(timeline: &Timeline) -> String {
    let mut out = String::new();
    push_record(&mut out, EventRow::HEADER.iter().copied());
    for row in event_rows(timeline) {
        let fields = row.fields();
        push_record(&mut out, fields.iter().map(String::as_str));
    }
    out
}

pub fn write_csv<W: io::Write>(timeline: &Timeline, mut writer: W) -> PipelineResult<()> {
    writer.write_all(to_csv(timeline).as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}
