//! Date format catalogue and parsers.
//!
//! Two entry points are used by the rest of the crate:
//!
//! - `DATE_FORMATS`: an explicit, ordered list of formats. The classifier tries
//!   each one against a column sample and accepts a format that parses most of it.
//! - `parse_any`: unconstrained inference for a single cell (RFC 3339/2822,
//!   timestamps with fractional seconds, quarter labels, then every explicit format).
//!
//! All parsers return a calendar date; any time-of-day is discarded because
//! the series is never finer than a quarter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Date,
    DateTime,
    /// No day component: the first of the month is assumed.
    YearMonth,
    /// Four-digit year only: January 1st is assumed.
    Year,
}

/// One entry of the explicit format catalogue (chrono `strftime` syntax).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub pattern: &'static str,
    shape: Shape,
}

const fn fmt(pattern: &'static str, shape: Shape) -> DateFormat {
    DateFormat { pattern, shape }
}

/// Explicit formats, tried in order. US month-first variants come before
/// day-first ones so ambiguous values resolve month-first.
pub const DATE_FORMATS: [DateFormat; 22] = [
    fmt("%Y-%m-%d", Shape::Date),
    fmt("%Y/%m/%d", Shape::Date),
    fmt("%Y.%m.%d", Shape::Date),
    fmt("%Y%m%d", Shape::Date),
    fmt("%Y-%m-%d %H:%M:%S", Shape::DateTime),
    fmt("%Y-%m-%dT%H:%M:%S", Shape::DateTime),
    fmt("%m/%d/%Y", Shape::Date),
    fmt("%m-%d-%Y", Shape::Date),
    fmt("%m/%d/%y", Shape::Date),
    fmt("%m/%d/%Y %H:%M", Shape::DateTime),
    fmt("%d/%m/%Y", Shape::Date),
    fmt("%d-%m-%Y", Shape::Date),
    fmt("%d.%m.%Y", Shape::Date),
    fmt("%d/%m/%y", Shape::Date),
    fmt("%d %B %Y", Shape::Date),
    fmt("%d %b %Y", Shape::Date),
    fmt("%B %d, %Y", Shape::Date),
    fmt("%b %d, %Y", Shape::Date),
    fmt("%Y-%m", Shape::YearMonth),
    fmt("%B %Y", Shape::YearMonth),
    fmt("%b %Y", Shape::YearMonth),
    fmt("%Y", Shape::Year),
];

/// Timestamp layouts only reachable through `parse_any`.
const EXTRA_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

impl DateFormat {
    /// Parse a single trimmed cell with this format.
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        match self.shape {
            Shape::Date => NaiveDate::parse_from_str(s, self.pattern).ok(),
            Shape::DateTime => NaiveDateTime::parse_from_str(s, self.pattern)
                .ok()
                .map(|dt| dt.date()),
            Shape::YearMonth => {
                NaiveDate::parse_from_str(&format!("{s}|01"), &format!("{}|%d", self.pattern)).ok()
            }
            Shape::Year => parse_year(s),
        }
    }
}

/// `true` for a six-digit `YYYYMM` code such as `202301`.
pub fn is_year_month_code(s: &str) -> bool {
    let s = s.trim();
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a `YYYYMM` code to the first day of that month.
pub fn parse_year_month_code(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !is_year_month_code(s) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Unconstrained date inference for a single cell.
pub fn parse_any(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_year_month_code(s) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    if let Some(d) = parse_quarter_label(s) {
        return Some(d);
    }
    for pattern in EXTRA_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS.iter().find_map(|f| f.parse(s))
}

fn parse_year(s: &str) -> Option<NaiveDate> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// `2023Q1`, `2023-Q1`, `2023 Q1` (case-insensitive) → first day of the quarter.
fn parse_quarter_label(s: &str) -> Option<NaiveDate> {
    let upper = s.to_ascii_uppercase();
    let (year, quarter) = upper.split_once('Q')?;
    let year = year.trim_end_matches(['-', ' ']);
    if year.len() != 4 || quarter.len() != 1 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let quarter: u32 = quarter.parse().ok()?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}
