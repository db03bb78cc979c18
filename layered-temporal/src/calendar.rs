//! Calendar arithmetic and word tables used by the parser.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use layered_timeline::{DateRange, TimeRelation};

/// Month alternation shared by the absolute-date patterns.
pub(crate) const MONTH_ALTERNATION: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec";

/// Number words accepted as counts in relative expressions.
pub(crate) const COUNT_ALTERNATION: &str =
    r"\d+|an|a|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve";

pub(crate) const WEEKDAY_ALTERNATION: &str =
    "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

/// Parse a full or abbreviated month name to its number (1-12).
pub(crate) fn month_number(text: &str) -> Option<u32> {
    match text.trim_end_matches('.').to_lowercase().as_str() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

pub(crate) fn weekday(text: &str) -> Option<Weekday> {
    match text.to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a digit string or a written count ("a", "an", "one" through "twelve").
pub(crate) fn count(text: &str) -> Option<u32> {
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    match text.to_lowercase().as_str() {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => None,
    }
}

/// Two-digit years 00-69 map to 2000-2069, 70-99 to 1970-1999.
pub(crate) fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    Some(match (text.len(), year) {
        (2, y) if y < 70 => 2000 + y,
        (2, y) => 1900 + y,
        (_, y) => y,
    })
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Build a datetime, rejecting impossible calendar dates and clock times.
pub(crate) fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Convert a 12-hour clock reading to 24-hour.
pub(crate) fn hour_24(hour: u32, meridiem: &str) -> Option<u32> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = meridiem.to_lowercase().starts_with('p');
    Some(match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    })
}

pub(crate) fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

pub(crate) fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

pub(crate) fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(23, 59, 59)
}

/// The Monday-to-Sunday week containing `date`, offset by `weeks`.
pub(crate) fn week_range(date: NaiveDate, weeks: i64) -> Option<DateRange> {
    let monday = shift_days(date, -(date.weekday().num_days_from_monday() as i64))?;
    let start = shift_days(monday, weeks * 7)?;
    let end = shift_days(start, 6)?;
    Some(DateRange::new(midnight(start), end_of_day(end)?))
}

/// The calendar month containing `date`, offset by `months`.
pub(crate) fn month_range(date: NaiveDate, months: i64) -> Option<DateRange> {
    let first = shift_months(first_of_month(date.year(), date.month())?, months)?;
    let last = shift_days(shift_months(first, 1)?, -1)?;
    Some(DateRange::new(midnight(first), end_of_day(last)?))
}

pub(crate) fn year_range(year: i32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(DateRange::new(midnight(start), end_of_day(end)?))
}

pub(crate) fn quarter_range(year: i32, quarter: u32) -> Option<DateRange> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let first = first_of_month(year, (quarter - 1) * 3 + 1)?;
    month_range(first, 0).and_then(|q_start| {
        let q_end = month_range(first, 2)?;
        Some(DateRange::new(q_start.start, q_end.end))
    })
}

/// Resolve `last|this|next <weekday>` relative to `reference`.
///
/// `last` is strictly before the reference day and `next` strictly after;
/// `this` stays within the reference week.
pub(crate) fn relative_weekday(reference: NaiveDate, direction: &str, target: Weekday) -> Option<NaiveDate> {
    let diff = target.num_days_from_monday() as i64 - reference.weekday().num_days_from_monday() as i64;
    let offset = match direction {
        "last" if diff >= 0 => diff - 7,
        "next" if diff <= 0 => diff + 7,
        "last" | "next" | "this" => diff,
        _ => return None,
    };
    shift_days(reference, offset)
}

/// Position of an instant or span relative to the reference day.
pub(crate) fn relation_to(reference: NaiveDate, point: Option<NaiveDateTime>, range: Option<DateRange>) -> Option<TimeRelation> {
    let (first, last) = match (point, range) {
        (_, Some(range)) => (range.start.date(), range.end.date()),
        (Some(point), None) => (point.date(), point.date()),
        (None, None) => return None,
    };
    Some(if last < reference {
        TimeRelation::Past
    } else if first > reference {
        TimeRelation::Future
    } else {
        TimeRelation::Present
    })
}
