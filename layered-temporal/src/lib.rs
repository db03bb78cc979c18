//! Temporal expression extraction for legal timelines.
//!
//! [`TemporalParser`] finds absolute dates, relative dates, date ranges and
//! recurrences in raw document text and normalizes them against a reference
//! instant. The parser is constructed once and is immutable, so it can be
//! shared across threads and documents.
//!
//! ## Example
//!
//! ```ignore
//! use chrono::NaiveDate;
//! use layered_temporal::TemporalParser;
//!
//! let parser = TemporalParser::new();
//! let reference = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let found = parser.parse("The complaint was filed on March 3, 2024.", reference);
//! assert_eq!(found[0].text, "March 3, 2024");
//! ```

mod calendar;
mod parser;

pub use parser::{TemporalParser, TemporalParserConfig};

#[cfg(test)]
mod tests {
    mod parser;
}
