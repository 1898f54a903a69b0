//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads settings
//! - installs the tracing subscriber
//! - runs the forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DetectArgs, ForecastArgs, PlotArgs, PlotOptions, SampleArgs};
use crate::config::Settings;
use crate::domain::{ForecastConfig, ForecastResult};
use crate::error::AppError;

pub mod pipeline;

use pipeline::{ForecastJob, ForecastResponse};

/// Future rows shown in the text report.
const REPORT_ROWS: usize = 12;

/// Entry point for the `fcst` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    init_tracing(&settings, cli.verbose);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args, &settings),
        Command::Detect(args) => handle_detect(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing(settings: &Settings, verbose: bool) {
    let filter = EnvFilter::try_new(settings.log_directive(verbose)).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. in tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_forecast(args: ForecastArgs, settings: &Settings) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args, settings);
    let bytes = read_input(&args.input)?;

    let mut job = ForecastJob::new(config.clone());
    let outcome = job.run(&bytes).cloned();

    if args.json {
        let response = ForecastResponse::from(outcome.clone());
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::new(4, format!("Failed to serialize response: {e}")))?;
        println!("{json}");
    }
    let result = outcome?;

    if !args.json {
        if let (Some(decoded), Some(selection), Some(prepared)) = (job.decoded(), job.selection(), job.prepared()) {
            println!(
                "{}",
                crate::report::format_run_summary(decoded, selection, &prepared.report, &result, &config)
            );
        }
        println!("{}", crate::report::format_forecast_table(&result, REPORT_ROWS));
        print_plot(&result, &args.plot);
    }

    // Optional exports.
    if let Some(path) = &args.output {
        crate::io::write_result_json(path, &result)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_forecast_csv(path, &result)?;
    }

    Ok(())
}

fn handle_detect(args: DetectArgs) -> Result<(), AppError> {
    let bytes = read_input(&args.input)?;
    let detection = pipeline::detect_columns(&bytes)?;
    println!("{}", crate::report::format_detection(&detection));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let result = crate::io::read_result_json(&args.result)?;
    println!("{}", crate::report::format_metrics(&result.metrics));
    print_plot(&result, &args.plot);
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig::new(args.period, args.count, args.seed);
    let table = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.output, &table)?;
    println!("Wrote {} row(s) to {}", table.row_count(), args.output.display());
    Ok(())
}

fn print_plot(result: &ForecastResult, opts: &PlotOptions) {
    if opts.no_plot {
        return;
    }
    let plot = crate::plot::render_forecast_plot(result, opts.plot_type, opts.width, opts.height);
    println!("{plot}");
}

fn read_input(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|e| AppError::new(2, format!("Failed to read input '{}': {e}", path.display())))
}

pub fn forecast_config_from_args(args: &ForecastArgs, settings: &Settings) -> ForecastConfig {
    ForecastConfig {
        period: args.period,
        horizon: args.horizon,
        five_year_forecast: args.five_year,
        yearly_seasonality: !args.no_yearly_seasonality,
        include_holidays: args.holidays,
        date_column: args.date_column.clone(),
        target_column: args.target_column.clone(),
        interval_width: settings.interval_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;

    #[test]
    fn args_map_onto_request_config() {
        let cli = Cli::parse_from([
            "fcst",
            "forecast",
            "-i",
            "in.csv",
            "--period",
            "yearly",
            "--no-yearly-seasonality",
            "--target-column",
            "revenue",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        let settings = Settings {
            interval_width: 0.9,
            ..Settings::default()
        };
        let config = forecast_config_from_args(&args, &settings);
        assert_eq!(config.period, Frequency::Yearly);
        assert!(!config.yearly_seasonality);
        assert!(!config.include_holidays);
        assert_eq!(config.target_column.as_deref(), Some("revenue"));
        assert_eq!(config.date_column, None);
        assert!((config.interval_width - 0.9).abs() < 1e-12);
    }

    #[test]
    fn forecast_command_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let table = crate::data::generate_sample(&crate::data::SampleConfig::new(Frequency::Quarterly, 48, 3)).unwrap();
        crate::data::write_sample_csv(&input, &table).unwrap();

        let output = dir.path().join("result.json");
        let export = dir.path().join("forecast.csv");
        let argv: [String; 9] = [
            "fcst".into(),
            "forecast".into(),
            "--input".into(),
            input.display().to_string(),
            "--output".into(),
            output.display().to_string(),
            "--export-csv".into(),
            export.display().to_string(),
            "--no-plot".into(),
        ];
        let cli = Cli::parse_from(argv);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        handle_forecast(args, &Settings::default()).unwrap();

        let result = crate::io::read_result_json(&output).unwrap();
        assert_eq!(result.horizon, 12);
        let csv = std::fs::read_to_string(&export).unwrap();
        assert_eq!(csv.lines().count(), result.full_forecast.len() + 1);
    }

    #[test]
    fn missing_input_is_an_input_error() {
        let err = read_input(Path::new("/no/such/upload.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
