//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and model code stay clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::Detection;
use crate::classify::{ColumnSelection, DateRule};
use crate::domain::{ColumnRole, ForecastConfig, ForecastResult, Metrics};
use crate::io::decode::{DecodedTable, delimiter_label};
use crate::models::HOLIDAY_REGION;
use crate::series::{DateParser, PreprocessReport};

/// Format the run summary: input, series, split and backtest.
pub fn format_run_summary(
    decoded: &DecodedTable,
    selection: &ColumnSelection,
    report: &PreprocessReport,
    result: &ForecastResult,
    config: &ForecastConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== fcst - seasonal forecast ===\n");
    out.push_str(&format!(
        "Input: {} row(s) x {} column(s) | encoding={} delimiter={}\n",
        decoded.table.row_count(),
        decoded.table.column_count(),
        decoded.encoding,
        delimiter_label(decoded.delimiter),
    ));
    if decoded.skipped_lines > 0 {
        out.push_str(&format!("       {} malformed line(s) skipped\n", decoded.skipped_lines));
    }
    out.push_str(&format!(
        "Columns: date='{}' ({}) target='{}'\n",
        selection.date_column.as_deref().unwrap_or("?"),
        match report.date_parser {
            DateParser::YearMonthCode => "YYYYMM",
            DateParser::Inferred => "inferred",
        },
        selection.target_column.as_deref().unwrap_or("?"),
    ));
    out.push_str(&format!(
        "Rows: read={} dropped={} missing_target={}\n",
        report.rows_read, report.rows_dropped, report.missing_targets
    ));

    let span = match (result.historical.first(), result.historical.last()) {
        (Some(a), Some(b)) => format!("{}..{}", a.ds, b.ds),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "Series: {} {} period(s) {span} | imputed={}\n",
        report.periods,
        result.frequency.display_name(),
        report.imputed_periods,
    ));
    out.push_str(&format!(
        "Split: train={} test={} | horizon={}{}\n",
        result.train.len(),
        result.test.len(),
        result.horizon,
        if config.five_year_forecast { " (five-year)" } else { "" },
    ));
    out.push_str(&format!(
        "Model: trend{}{} | interval={:.0}%\n",
        if result.seasonal_component.is_some() { " + yearly" } else { "" },
        if result.holiday_component.is_some() {
            format!(" + holidays ({HOLIDAY_REGION})")
        } else {
            String::new()
        },
        config.interval_width * 100.0,
    ));

    out.push_str("\nBacktest:\n");
    out.push_str(&format_metrics(&result.metrics));
    out.push('\n');

    out
}

/// One line per metric; `n/a` when the test set could not be scored.
pub fn format_metrics(metrics: &Metrics) -> String {
    let fmt = |v: Option<f64>, suffix: &str| v.map(|x| format!("{x:.4}{suffix}")).unwrap_or_else(|| "n/a".to_string());
    format!(
        "  RMSE {}\n  MAE  {}\n  MAPE {}\n",
        fmt(metrics.rmse, ""),
        fmt(metrics.mae, ""),
        fmt(metrics.mape, "%"),
    )
}

/// Future predictions as a table (first `max_rows`).
pub fn format_forecast_table(result: &ForecastResult, max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("Forecast:\n");
    out.push_str(&format!("{:<12} {:>14} {:>14} {:>14}\n", "ds", "yhat", "lower", "upper"));
    out.push_str(&format!("{:-<12} {:-<14} {:-<14} {:-<14}\n", "", "", "", ""));

    for p in result.forecast.iter().take(max_rows) {
        out.push_str(&format!(
            "{:<12} {:>14.4} {:>14.4} {:>14.4}\n",
            p.ds.to_string(),
            p.yhat,
            p.yhat_lower,
            p.yhat_upper
        ));
    }
    if result.forecast.len() > max_rows {
        out.push_str(&format!("... {} more\n", result.forecast.len() - max_rows));
    }
    if result.forecast.is_empty() {
        out.push_str("(no periods beyond the last observation)\n");
    }
    out
}

/// Column roles found by `detect`.
pub fn format_detection(detection: &Detection) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Input: {} row(s) | encoding={} delimiter={}",
        detection.rows, detection.encoding, detection.delimiter
    ));
    if detection.skipped_lines > 0 {
        out.push_str(&format!(" | {} malformed line(s) skipped", detection.skipped_lines));
    }
    out.push_str("\n\n");

    out.push_str(format!("{:<24} {:<14} {:>8} {:>9} {}\n", "column", "role", "numeric", "non-empty", "date rule").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<14} {:-<8} {:-<9} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for p in &detection.selection.profiles {
        let role = match p.role {
            ColumnRole::Date => "date",
            ColumnRole::NumericTarget => "target",
            ColumnRole::Other => "",
        };
        let rule = match p.date_rule {
            Some(DateRule::YearMonthCode) => "YYYYMM".to_string(),
            Some(DateRule::Format(f)) => f.to_string(),
            Some(DateRule::Inferred) => "inferred".to_string(),
            None => String::new(),
        };
        out.push_str(
            format!(
                "{:<24} {:<14} {:>8} {:>9} {}\n",
                truncate(&p.name, 24),
                role,
                if p.numeric { "yes" } else { "no" },
                p.non_empty,
                rule
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!(
        "\nSuggested: date={} target={}\n",
        detection.selection.date_column.as_deref().unwrap_or("<none>"),
        detection.selection.target_column.as_deref().unwrap_or("<none>"),
    ));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::detect_columns;

    #[test]
    fn metrics_show_na_when_missing() {
        let txt = format_metrics(&Metrics::default());
        assert_eq!(txt, "  RMSE n/a\n  MAE  n/a\n  MAPE n/a\n");

        let txt = format_metrics(&Metrics {
            rmse: Some(2.0),
            mae: Some(1.5),
            mape: Some(12.25),
        });
        assert!(txt.contains("RMSE 2.0000"));
        assert!(txt.contains("MAPE 12.2500%"));
    }

    #[test]
    fn detection_table_lists_roles() {
        let detection = detect_columns(b"when,amount,note\n2021-01-01,1,a\n2021-02-01,2,b\n2021-03-01,3,c\n2021-04-01,4,d\n2021-05-01,5,e\n").unwrap();
        let txt = format_detection(&detection);
        assert!(txt.contains("encoding=UTF-8 delimiter=comma"));
        assert!(txt.lines().any(|l| l.starts_with("when") && l.contains("date")));
        assert!(txt.lines().any(|l| l.starts_with("amount") && l.contains("target")));
        assert!(txt.ends_with("Suggested: date=when target=amount\n"));
    }

    #[test]
    fn summary_names_model_parts() {
        let mut csv = String::from("month,sales\n");
        for i in 0..36 {
            csv.push_str(&format!("{}{:02},{}\n", 2021 + i / 12, i % 12 + 1, 10 + i % 5 + i / 3));
        }
        let config = ForecastConfig {
            include_holidays: true,
            yearly_seasonality: false,
            horizon: 2,
            ..ForecastConfig::default()
        };
        let mut job = crate::app::pipeline::ForecastJob::new(config.clone());
        let result = job.run(csv.as_bytes()).unwrap().clone();
        let txt = format_run_summary(
            job.decoded().unwrap(),
            job.selection().unwrap(),
            &job.prepared().unwrap().report,
            &result,
            &config,
        );
        assert!(txt.contains("Columns: date='month' (YYYYMM) target='sales'"));
        assert!(txt.contains("Model: trend + holidays (US) | interval=80%"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
