//! Column classification: which column is the date axis, which is the target.
//!
//! The classifier is advisory. It looks at a sample of each column and
//! suggests a `(date, target)` pair. A column the caller already selected is
//! taken as given and only the other one is detected.
//!
//! Date heuristic, per column (first 100 non-empty cells, at least 5 required):
//!
//! 1. ≥80% are six-digit `YYYYMM` codes
//! 2. else some single entry of `DATE_FORMATS` parses ≥80%
//! 3. else unconstrained inference (`parse_any`) parses ≥80%
//!
//! The target is the first numeric column that is not the date column.

pub mod dates;

use serde::Serialize;

use crate::domain::{ColumnRole, RawTable};

pub use dates::{DATE_FORMATS, DateFormat, is_year_month_code, parse_any, parse_year_month_code};

/// Maximum number of non-empty cells inspected per column.
pub const SAMPLE_SIZE: usize = 100;

/// Minimum number of non-empty cells needed before a column can be a date.
pub const MIN_SAMPLES: usize = 5;

/// Share of sampled cells that must parse for a rule to match.
pub const MATCH_RATIO: f64 = 0.8;

/// Which rule classified a column as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule", content = "format")]
pub enum DateRule {
    YearMonthCode,
    Format(&'static str),
    Inferred,
}

/// What the classifier learned about one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub role: ColumnRole,
    pub date_rule: Option<DateRule>,
    pub numeric: bool,
    pub non_empty: usize,
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSelection {
    pub date_column: Option<String>,
    pub target_column: Option<String>,
    pub profiles: Vec<ColumnProfile>,
}

/// Suggest date and target columns for `table`.
///
/// A non-blank hint is used verbatim, even when no such column exists; the
/// preprocessor rejects unknown names.
pub fn classify(table: &RawTable, date_hint: Option<&str>, target_hint: Option<&str>) -> ColumnSelection {
    let mut profiles: Vec<ColumnProfile> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<&str> = non_empty_values(table, idx).collect();
            let sample: Vec<&str> = values.iter().copied().take(SAMPLE_SIZE).collect();
            let date_rule = detect_date_rule(&sample);
            tracing::debug!(column = %name, ?date_rule, "date heuristic");
            ColumnProfile {
                name: name.clone(),
                role: ColumnRole::Other,
                date_rule,
                numeric: is_numeric_column(&values),
                non_empty: values.len(),
            }
        })
        .collect();

    let date_column = resolve_hint(date_hint).or_else(|| {
        profiles
            .iter()
            .find(|p| p.date_rule.is_some())
            .map(|p| p.name.clone())
    });

    let target_column = resolve_hint(target_hint).or_else(|| {
        profiles
            .iter()
            .find(|p| p.numeric && Some(&p.name) != date_column.as_ref())
            .map(|p| p.name.clone())
    });

    for profile in profiles.iter_mut() {
        if Some(&profile.name) == date_column.as_ref() {
            profile.role = ColumnRole::Date;
        } else if Some(&profile.name) == target_column.as_ref() {
            profile.role = ColumnRole::NumericTarget;
        }
    }

    tracing::info!(
        date = date_column.as_deref().unwrap_or("<none>"),
        target = target_column.as_deref().unwrap_or("<none>"),
        "column classification"
    );

    ColumnSelection {
        date_column,
        target_column,
        profiles,
    }
}

/// Run the date heuristic over a column sample.
pub fn detect_date_rule(sample: &[&str]) -> Option<DateRule> {
    if sample.len() < MIN_SAMPLES {
        return None;
    }

    if share(sample, |s| is_year_month_code(s)) >= MATCH_RATIO {
        return Some(DateRule::YearMonthCode);
    }

    if let Some(format) = DATE_FORMATS
        .iter()
        .find(|f| share(sample, |s| f.parse(s).is_some()) >= MATCH_RATIO)
    {
        return Some(DateRule::Format(format.pattern));
    }

    if share(sample, |s| parse_any(s).is_some()) >= MATCH_RATIO {
        return Some(DateRule::Inferred);
    }

    None
}

/// `true` when the column holds mostly `YYYYMM` codes.
///
/// The preprocessor uses this to pick the explicit `%Y%m` parser.
pub fn looks_like_year_month_codes(table: &RawTable, idx: usize) -> bool {
    let sample: Vec<&str> = non_empty_values(table, idx).take(SAMPLE_SIZE).collect();
    !sample.is_empty() && share(&sample, |s| is_year_month_code(s)) >= MATCH_RATIO
}

/// A column is numeric when it has at least one value and every non-empty
/// cell parses as a finite number.
pub fn is_numeric_column(values: &[&str]) -> bool {
    !values.is_empty() && values.iter().all(|s| parse_number(s).is_some())
}

/// Parse a numeric cell. Non-finite values count as missing.
pub fn parse_number(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Spellings of "no value" that spreadsheet and dataframe exports emit.
const MISSING_MARKERS: [&str; 8] = ["na", "n/a", "#n/a", "nan", "null", "none", "nat", "-"];

/// `true` for empty cells and the usual missing-value spellings.
pub fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

fn non_empty_values(table: &RawTable, idx: usize) -> impl Iterator<Item = &str> + '_ {
    table
        .column_values(idx)
        .map(str::trim)
        .filter(|s| !is_missing(s))
}

fn share(sample: &[&str], pred: impl Fn(&str) -> bool) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let hits = sample.iter().filter(|&&s| pred(s)).count();
    hits as f64 / sample.len() as f64
}

fn resolve_hint(hint: Option<&str>) -> Option<String> {
    let hint = hint?.trim();
    (!hint.is_empty()).then(|| hint.to_string())
}
