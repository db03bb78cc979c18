//! Regex-driven temporal expression extraction.
//!
//! [`TemporalParser`] runs four pattern passes over raw text and an optional
//! entity pass for bare months, quarters and years:
//!
//! - **Absolute**: "2024-03-15", "3/15/2024", "March 15th, 2024 at 2:30 pm",
//!   "15th day of March, 2024", "March 2024"
//! - **Relative**: "yesterday", "next week", "last Friday", "three days ago", "in 2 months"
//! - **Range**: "from March 1, 2024 to March 5, 2024", "between 1/2/2024 and 1/9/2024"
//! - **Recurring**: "every Monday", "each quarter", "monthly"
//!
//! Relative expressions resolve against a caller-supplied reference instant.
//! Parsing never fails: candidates that do not form a valid calendar date are
//! dropped.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime};
use layered_timeline::{
    DateRange, ExpressionSource, Recurrence, TemporalExpression, TemporalKind,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::calendar::{
    self, count, datetime, expand_year, hour_24, midnight, month_number, relation_to,
    COUNT_ALTERNATION, MONTH_ALTERNATION, WEEKDAY_ALTERNATION,
};

/// Confidence levels for each extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalParserConfig {
    pub absolute_confidence: f64,
    pub relative_confidence: f64,
    pub range_confidence: f64,
    pub recurring_confidence: f64,
    pub month_entity_confidence: f64,
    pub quarter_entity_confidence: f64,
    pub year_entity_confidence: f64,
    /// Run the secondary pass for bare months, quarters and years
    pub entity_pass: bool,
}

impl Default for TemporalParserConfig {
    fn default() -> Self {
        Self {
            absolute_confidence: 0.9,
            relative_confidence: 0.7,
            range_confidence: 0.8,
            recurring_confidence: 0.8,
            month_entity_confidence: 0.6,
            quarter_entity_confidence: 0.6,
            year_entity_confidence: 0.4,
            entity_pass: true,
        }
    }
}

impl TemporalParserConfig {
    pub fn with_entity_pass(mut self, enabled: bool) -> Self {
        self.entity_pass = enabled;
        self
    }
}

/// An absolute date match before it becomes an expression.
#[derive(Debug, Clone, Copy)]
struct DateMatch {
    start: usize,
    end: usize,
    when: NaiveDateTime,
}

impl DateMatch {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn overlaps(&self, other: &DateMatch) -> bool {
        self.start < other.end && other.start < self.end
    }
}

type DateResolver = fn(&Captures) -> Option<NaiveDateTime>;

/// Finds and normalizes temporal expressions in text.
///
/// All patterns are compiled once on construction; the parser is immutable
/// and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TemporalParser {
    config: TemporalParserConfig,
    iso_date: Regex,
    us_date: Regex,
    month_day_year: Regex,
    day_month_year: Regex,
    month_year: Regex,
    range_opener: Regex,
    range_connector: Regex,
    relative_day: Regex,
    relative_unit: Regex,
    units_ago: Regex,
    units_ahead: Regex,
    every: Regex,
    each: Regex,
    cadence: Regex,
    entity_month: Regex,
    entity_quarter: Regex,
    entity_quarter_words: Regex,
    entity_year: Regex,
}

impl Default for TemporalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalParser {
    pub fn new() -> Self {
        Self::with_config(TemporalParserConfig::default())
    }

    pub fn with_config(config: TemporalParserConfig) -> Self {
        let iso_date = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ](\d{1,2}):(\d{2}))?\b")
            .expect("Invalid ISO date regex");
        let us_date = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b")
            .expect("Invalid US date regex");
        let month_day_year = Regex::new(&format!(
            r"(?i)\b({MONTH_ALTERNATION})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b(?:,?\s+at\s+(\d{{1,2}}):(\d{{2}})\s*([ap])(?:\.m\.|m\b))?"
        ))
        .expect("Invalid month-day-year regex");
        let day_month_year = Regex::new(&format!(
            r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:day\s+of\s+)?({MONTH_ALTERNATION})\.?,?\s+(\d{{4}})\b"
        ))
        .expect("Invalid day-month-year regex");
        // case-sensitive so that modal "may" is never read as a month
        let month_year = Regex::new(&format!(r"\b({MONTH_ALTERNATION})\.?\s+(\d{{4}})\b"))
            .expect("Invalid month-year regex");

        let range_opener =
            Regex::new(r"(?i)\b(from|between)\s+$").expect("Invalid range opener regex");
        let range_connector = Regex::new(r"(?i)^\s*(to|until|through|and|-|–)\s*$")
            .expect("Invalid range connector regex");

        let relative_day =
            Regex::new(r"(?i)\b(yesterday|today|tomorrow)\b").expect("Invalid relative day regex");
        let relative_unit = Regex::new(&format!(
            r"(?i)\b(last|this|next)\s+(week|month|year|{WEEKDAY_ALTERNATION})\b"
        ))
        .expect("Invalid relative unit regex");
        let units_ago = Regex::new(&format!(
            r"(?i)\b({COUNT_ALTERNATION})\s+(day|week|month|year)s?\s+ago\b"
        ))
        .expect("Invalid ago regex");
        let units_ahead = Regex::new(&format!(
            r"(?i)\bin\s+({COUNT_ALTERNATION})\s+(day|week|month|year)s?\b"
        ))
        .expect("Invalid future offset regex");

        let every = Regex::new(&format!(
            r"(?i)\bevery\s+(?:(other)\s+)?(?:(\d+|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(day|week|month)s\b|({WEEKDAY_ALTERNATION}|day|week|month|year|quarter)\b)"
        ))
        .expect("Invalid every regex");
        let each = Regex::new(r"(?i)\beach\s+(week|month|year|quarter)\b").expect("Invalid each regex");
        let cadence = Regex::new(r"(?i)\b(daily|weekly|bi-?weekly|monthly|quarterly|annually|yearly)\b")
            .expect("Invalid cadence regex");

        let entity_month = Regex::new(
            r"\b(?:[Ii]n|[Dd]uring|[Bb]y|[Ss]ince|[Uu]ntil|[Bb]efore|[Aa]fter|[Oo]f|[Oo]n)\s+(January|February|March|April|May|June|July|August|September|October|November|December)\b",
        )
        .expect("Invalid month entity regex");
        let entity_quarter =
            Regex::new(r"\bQ([1-4])\s+(?:of\s+)?(\d{4})\b").expect("Invalid quarter regex");
        let entity_quarter_words = Regex::new(
            r"(?i)\b(first|second|third|fourth|1st|2nd|3rd|4th)\s+quarter\s+(?:of\s+)?(\d{4})\b",
        )
        .expect("Invalid quarter words regex");
        let entity_year = Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("Invalid year regex");

        Self {
            config,
            iso_date,
            us_date,
            month_day_year,
            day_month_year,
            month_year,
            range_opener,
            range_connector,
            relative_day,
            relative_unit,
            units_ago,
            units_ahead,
            every,
            each,
            cadence,
            entity_month,
            entity_quarter,
            entity_quarter_words,
            entity_year,
        }
    }

    pub fn config(&self) -> &TemporalParserConfig {
        &self.config
    }

    /// Extract every temporal expression in `text`, resolving relative
    /// expressions against `reference`.
    ///
    /// Output is ordered by start offset, then by confidence (highest first).
    pub fn parse(&self, text: &str, reference: NaiveDateTime) -> Vec<TemporalExpression> {
        let dates = self.absolute_dates(text);
        let (ranges, consumed) = self.ranges(text, &dates, reference);

        let mut found: Vec<TemporalExpression> = dates
            .iter()
            .enumerate()
            .filter(|(idx, _)| !consumed.contains(idx))
            .map(|(_, m)| {
                self.expression(
                    text,
                    (m.start, m.end),
                    Some(m.when),
                    None,
                    TemporalKind::Absolute,
                    self.config.absolute_confidence,
                    reference,
                )
            })
            .collect();
        found.extend(ranges);
        found.extend(self.relative_dates(text, reference));
        found.extend(self.recurring(text));

        if self.config.entity_pass {
            let entities = self.entities(text, reference, &found);
            found.extend(entities);
        }

        found.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
        });

        tracing::debug!(expressions = found.len(), "parsed temporal expressions");
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn expression(
        &self,
        text: &str,
        (start, end): (usize, usize),
        normalized: Option<NaiveDateTime>,
        range: Option<DateRange>,
        kind: TemporalKind,
        confidence: f64,
        reference: NaiveDateTime,
    ) -> TemporalExpression {
        TemporalExpression {
            text: text[start..end].to_string(),
            normalized,
            range,
            kind,
            recurrence: None,
            relation: relation_to(reference.date(), normalized, range),
            source: ExpressionSource::Pattern,
            confidence,
            start,
            end,
        }
    }

    // ========================================================================
    // Absolute dates
    // ========================================================================

    /// All valid absolute dates, overlapping matches collapsed to the longest span.
    fn absolute_dates(&self, text: &str) -> Vec<DateMatch> {
        let passes: [(&Regex, DateResolver); 5] = [
            (&self.iso_date, resolve_iso),
            (&self.us_date, resolve_us),
            (&self.month_day_year, resolve_month_day_year),
            (&self.day_month_year, resolve_day_month_year),
            (&self.month_year, resolve_month_year),
        ];

        let mut candidates = Vec::new();
        for (regex, resolve) in passes {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                match resolve(&caps) {
                    Some(when) => candidates.push(DateMatch {
                        start: whole.start(),
                        end: whole.end(),
                        when,
                    }),
                    None => tracing::trace!(candidate = whole.as_str(), "dropping invalid date"),
                }
            }
        }

        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));
        let mut accepted: Vec<DateMatch> = Vec::new();
        for candidate in candidates {
            if !accepted.iter().any(|kept| kept.overlaps(&candidate)) {
                accepted.push(candidate);
            }
        }
        accepted.sort_by_key(|m| m.start);
        accepted
    }

    // ========================================================================
    // Ranges
    // ========================================================================

    /// Pair adjacent absolute dates joined by `from X to Y` or `between X and Y`.
    ///
    /// Returns the range expressions and the indices of the consumed bounds.
    fn ranges(
        &self,
        text: &str,
        dates: &[DateMatch],
        reference: NaiveDateTime,
    ) -> (Vec<TemporalExpression>, BTreeSet<usize>) {
        let mut ranges = Vec::new();
        let mut consumed = BTreeSet::new();

        for idx in 0..dates.len().saturating_sub(1) {
            if consumed.contains(&idx) {
                continue;
            }
            let (first, second) = (dates[idx], dates[idx + 1]);
            let Some(connector) = self.range_connector.captures(&text[first.end..second.start])
            else {
                continue;
            };
            let Some(opener) = self.range_opener.captures(&text[..first.start]) else {
                continue;
            };
            let (Some(opener_word), Some(opener_span), Some(connector_word)) =
                (opener.get(1), opener.get(0), connector.get(1))
            else {
                continue;
            };

            let opener_word = opener_word.as_str().to_lowercase();
            let connector_word = connector_word.as_str().to_lowercase();
            let paired = match opener_word.as_str() {
                "between" => connector_word == "and",
                _ => connector_word != "and",
            };
            if !paired {
                continue;
            }

            let range = DateRange::new(first.when, second.when);
            ranges.push(self.expression(
                text,
                (opener_span.start(), second.end),
                Some(range.start),
                Some(range),
                TemporalKind::Range,
                self.config.range_confidence,
                reference,
            ));
            consumed.insert(idx);
            consumed.insert(idx + 1);
        }

        (ranges, consumed)
    }

    // ========================================================================
    // Relative dates
    // ========================================================================

    fn relative_dates(&self, text: &str, reference: NaiveDateTime) -> Vec<TemporalExpression> {
        let today = reference.date();
        let confidence = self.config.relative_confidence;
        let mut found = Vec::new();

        for caps in self.relative_day.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let offset = match caps[1].to_lowercase().as_str() {
                "yesterday" => -1,
                "tomorrow" => 1,
                _ => 0,
            };
            if let Some(day) = calendar::shift_days(today, offset) {
                found.push(self.expression(
                    text,
                    (whole.start(), whole.end()),
                    Some(midnight(day)),
                    None,
                    TemporalKind::Relative,
                    confidence,
                    reference,
                ));
            }
        }

        for caps in self.relative_unit.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let direction = caps[1].to_lowercase();
            let offset: i64 = match direction.as_str() {
                "last" => -1,
                "next" => 1,
                _ => 0,
            };
            let unit = caps[2].to_lowercase();
            let resolved = match unit.as_str() {
                "week" => calendar::week_range(today, offset).map(|r| (r.start, Some(r))),
                "month" => calendar::month_range(today, offset).map(|r| (r.start, Some(r))),
                "year" => calendar::year_range(today.year() + offset as i32).map(|r| (r.start, Some(r))),
                weekday => calendar::weekday(weekday)
                    .and_then(|target| calendar::relative_weekday(today, &direction, target))
                    .map(|day| (midnight(day), None)),
            };
            match resolved {
                Some((point, range)) => found.push(self.expression(
                    text,
                    (whole.start(), whole.end()),
                    Some(point),
                    range,
                    TemporalKind::Relative,
                    confidence,
                    reference,
                )),
                None => tracing::trace!(candidate = whole.as_str(), "unresolvable relative date"),
            }
        }

        for (regex, sign) in [(&self.units_ago, -1i64), (&self.units_ahead, 1i64)] {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let Some(n) = count(&caps[1]) else { continue };
                let n = sign * n as i64;
                let day = match caps[2].to_lowercase().as_str() {
                    "day" => calendar::shift_days(today, n),
                    "week" => calendar::shift_days(today, n * 7),
                    "month" => calendar::shift_months(today, n),
                    _ => calendar::shift_months(today, n * 12),
                };
                if let Some(day) = day {
                    found.push(self.expression(
                        text,
                        (whole.start(), whole.end()),
                        Some(midnight(day)),
                        None,
                        TemporalKind::Relative,
                        confidence,
                        reference,
                    ));
                }
            }
        }

        found
    }

    // ========================================================================
    // Recurring
    // ========================================================================

    fn recurring(&self, text: &str) -> Vec<TemporalExpression> {
        let mut found = Vec::new();

        for caps in self.every.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let other = caps.get(1).is_some();
            let recurrence = match (caps.get(2), caps.get(3), caps.get(4)) {
                (Some(n), Some(unit), _) => {
                    let days = count(n.as_str()).and_then(|n| {
                        let days = match unit.as_str().to_lowercase().as_str() {
                            "day" => Some(n),
                            "week" => n.checked_mul(7),
                            _ => n.checked_mul(30),
                        }?;
                        if other {
                            days.checked_mul(2)
                        } else {
                            Some(days)
                        }
                    });
                    if days.is_none() {
                        tracing::trace!(candidate = whole.as_str(), "recurrence interval out of range");
                    }
                    days.map(Recurrence::EveryDays)
                }
                (_, _, Some(unit)) => every_unit(unit.as_str(), other),
                _ => None,
            };
            if let Some(recurrence) = recurrence {
                found.push(self.recurring_expression(text, whole.start(), whole.end(), recurrence));
            }
        }

        for caps in self.each.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(recurrence) = every_unit(&caps[1], false) {
                found.push(self.recurring_expression(text, whole.start(), whole.end(), recurrence));
            }
        }

        for caps in self.cadence.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let recurrence = match caps[1].to_lowercase().replace('-', "").as_str() {
                "daily" => Recurrence::Daily,
                "weekly" => Recurrence::Weekly,
                "biweekly" => Recurrence::Biweekly,
                "monthly" => Recurrence::Monthly,
                "quarterly" => Recurrence::Quarterly,
                _ => Recurrence::Annually,
            };
            found.push(self.recurring_expression(text, whole.start(), whole.end(), recurrence));
        }

        found
    }

    fn recurring_expression(
        &self,
        text: &str,
        start: usize,
        end: usize,
        recurrence: Recurrence,
    ) -> TemporalExpression {
        TemporalExpression {
            text: text[start..end].to_string(),
            normalized: None,
            range: None,
            kind: TemporalKind::Recurring,
            recurrence: Some(recurrence),
            relation: None,
            source: ExpressionSource::Pattern,
            confidence: self.config.recurring_confidence,
            start,
            end,
        }
    }

    // ========================================================================
    // Entity pass
    // ========================================================================

    /// Lower-confidence matches for bare months, quarters and years that no
    /// pattern expression already covers.
    fn entities(
        &self,
        text: &str,
        reference: NaiveDateTime,
        covered: &[TemporalExpression],
    ) -> Vec<TemporalExpression> {
        let is_covered = |start: usize, end: usize| covered.iter().any(|e| e.overlaps(start, end));
        let mut found = Vec::new();

        for caps in self.entity_month.captures_iter(text) {
            let Some(month) = caps.get(1) else { continue };
            if is_covered(month.start(), month.end()) {
                continue;
            }
            let day = month_number(month.as_str())
                .and_then(|m| calendar::first_of_month(reference.year(), m));
            if let Some(day) = day {
                found.push(self.entity_expression(
                    text,
                    (month.start(), month.end()),
                    Some(midnight(day)),
                    None,
                    self.config.month_entity_confidence,
                    reference,
                ));
            }
        }

        for regex in [&self.entity_quarter, &self.entity_quarter_words] {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if is_covered(whole.start(), whole.end()) {
                    continue;
                }
                let quarter = quarter_number(&caps[1]);
                let range = caps[2]
                    .parse::<i32>()
                    .ok()
                    .zip(quarter)
                    .and_then(|(year, q)| calendar::quarter_range(year, q));
                if let Some(range) = range {
                    found.push(self.entity_expression(
                        text,
                        (whole.start(), whole.end()),
                        Some(range.start),
                        Some(range),
                        self.config.quarter_entity_confidence,
                        reference,
                    ));
                }
            }
        }

        for caps in self.entity_year.captures_iter(text) {
            let Some(year) = caps.get(1) else { continue };
            if is_covered(year.start(), year.end()) {
                continue;
            }
            let day = year
                .as_str()
                .parse::<i32>()
                .ok()
                .and_then(|y| calendar::first_of_month(y, 1));
            if let Some(day) = day {
                found.push(self.entity_expression(
                    text,
                    (year.start(), year.end()),
                    Some(midnight(day)),
                    None,
                    self.config.year_entity_confidence,
                    reference,
                ));
            }
        }

        found
    }

    fn entity_expression(
        &self,
        text: &str,
        span: (usize, usize),
        normalized: Option<NaiveDateTime>,
        range: Option<DateRange>,
        confidence: f64,
        reference: NaiveDateTime,
    ) -> TemporalExpression {
        let mut expression = self.expression(
            text,
            span,
            normalized,
            range,
            TemporalKind::Absolute,
            confidence,
            reference,
        );
        expression.source = ExpressionSource::Entity;
        expression
    }
}

fn every_unit(unit: &str, other: bool) -> Option<Recurrence> {
    let unit = unit.to_lowercase();
    let recurrence = match (unit.as_str(), other) {
        ("day", false) => Recurrence::Daily,
        ("day", true) => Recurrence::EveryDays(2),
        ("week", false) => Recurrence::Weekly,
        ("week", true) => Recurrence::Biweekly,
        ("month", false) => Recurrence::Monthly,
        ("month", true) => Recurrence::EveryDays(60),
        ("quarter", false) => Recurrence::Quarterly,
        ("quarter", true) => Recurrence::EveryDays(180),
        ("year", false) => Recurrence::Annually,
        ("year", true) => Recurrence::EveryDays(730),
        (weekday, false) => Recurrence::OnWeekday(calendar::weekday(weekday)?),
        (weekday, true) => {
            calendar::weekday(weekday)?;
            Recurrence::EveryDays(14)
        }
    };
    Some(recurrence)
}

fn quarter_number(text: &str) -> Option<u32> {
    match text.to_lowercase().as_str() {
        "1" | "first" | "1st" => Some(1),
        "2" | "second" | "2nd" => Some(2),
        "3" | "third" | "3rd" => Some(3),
        "4" | "fourth" | "4th" => Some(4),
        _ => None,
    }
}

fn capture_u32(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn resolve_iso(caps: &Captures) -> Option<NaiveDateTime> {
    let year = caps[1].parse().ok()?;
    let hour = capture_u32(caps, 4).unwrap_or(0);
    let minute = capture_u32(caps, 5).unwrap_or(0);
    datetime(year, capture_u32(caps, 2)?, capture_u32(caps, 3)?, hour, minute)
}

fn resolve_us(caps: &Captures) -> Option<NaiveDateTime> {
    datetime(
        expand_year(&caps[3])?,
        capture_u32(caps, 1)?,
        capture_u32(caps, 2)?,
        0,
        0,
    )
}

fn resolve_month_day_year(caps: &Captures) -> Option<NaiveDateTime> {
    let (hour, minute) = match (capture_u32(caps, 4), capture_u32(caps, 5), caps.get(6)) {
        (Some(h), Some(m), Some(meridiem)) => (hour_24(h, meridiem.as_str())?, m),
        _ => (0, 0),
    };
    datetime(
        caps[3].parse().ok()?,
        month_number(&caps[1])?,
        capture_u32(caps, 2)?,
        hour,
        minute,
    )
}

fn resolve_day_month_year(caps: &Captures) -> Option<NaiveDateTime> {
    datetime(
        caps[3].parse().ok()?,
        month_number(&caps[2])?,
        capture_u32(caps, 1)?,
        0,
        0,
    )
}

fn resolve_month_year(caps: &Captures) -> Option<NaiveDateTime> {
    datetime(caps[2].parse().ok()?, month_number(&caps[1])?, 1, 0, 0)
}
