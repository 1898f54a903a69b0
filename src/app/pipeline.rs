//! End-to-end request pipeline shared by every front-end.
//!
//! bytes -> decode -> classify -> preprocess -> forecast
//!
//! `ForecastJob` carries one request through its lifecycle
//! (`Draft` -> `Processed` -> `Forecasted`). A failed step leaves the state
//! where it was. `run_request` wraps a whole job and never fails: errors come
//! back as `{"error": "..."}`.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};

use crate::classify::{ColumnSelection, classify};
use crate::domain::{ForecastConfig, ForecastResult, RunState};
use crate::error::PipelineError;
use crate::io::decode::{DecodedTable, decode, delimiter_label};
use crate::series::{Preprocessed, preprocess_with_report};

/// Outcome of a request, as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Success(ForecastResult),
    Failure { error: String },
}

impl ForecastResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ForecastResponse::Success(_))
    }
}

impl From<Result<ForecastResult, PipelineError>> for ForecastResponse {
    fn from(result: Result<ForecastResult, PipelineError>) -> Self {
        match result {
            Ok(r) => ForecastResponse::Success(r),
            Err(e) => ForecastResponse::Failure { error: e.to_string() },
        }
    }
}

/// What `detect` reports about an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub encoding: &'static str,
    pub delimiter: &'static str,
    pub rows: usize,
    pub skipped_lines: usize,
    #[serde(flatten)]
    pub selection: ColumnSelection,
}

/// One forecast request and everything computed for it so far.
#[derive(Debug, Clone)]
pub struct ForecastJob {
    config: ForecastConfig,
    state: RunState,
    decoded: Option<DecodedTable>,
    selection: Option<ColumnSelection>,
    prepared: Option<Preprocessed>,
    result: Option<ForecastResult>,
}

impl ForecastJob {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            state: RunState::Draft,
            decoded: None,
            selection: None,
            prepared: None,
            result: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn decoded(&self) -> Option<&DecodedTable> {
        self.decoded.as_ref()
    }

    pub fn selection(&self) -> Option<&ColumnSelection> {
        self.selection.as_ref()
    }

    pub fn prepared(&self) -> Option<&Preprocessed> {
        self.prepared.as_ref()
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        self.result.as_ref()
    }

    /// Decode, pick columns and build the series. Moves the job to `Processed`.
    ///
    /// Configured column names are used as given; only a column left unset
    /// is detected.
    pub fn process(&mut self, bytes: &[u8]) -> Result<&Preprocessed, PipelineError> {
        let decoded = decode(bytes)?;
        tracing::info!(
            rows = decoded.table.row_count(),
            columns = decoded.table.column_count(),
            encoding = decoded.encoding,
            delimiter = delimiter_label(decoded.delimiter),
            "decoded upload"
        );

        let selection = classify(
            &decoded.table,
            self.config.date_column.as_deref(),
            self.config.target_column.as_deref(),
        );
        let date_column = selection.date_column.clone().ok_or_else(|| {
            PipelineError::Config("no date column detected; select one explicitly".to_string())
        })?;
        let target_column = selection.target_column.clone().ok_or_else(|| {
            PipelineError::Config("no numeric target column detected; select one explicitly".to_string())
        })?;

        let prepared = preprocess_with_report(&decoded.table, &date_column, &target_column, self.config.period)?;

        self.decoded = Some(decoded);
        self.selection = Some(selection);
        self.result = None;
        self.state = RunState::Processed;
        Ok(self.prepared.insert(prepared))
    }

    /// Fit and predict on the processed series. Moves the job to `Forecasted`.
    pub fn forecast(&mut self) -> Result<&ForecastResult, PipelineError> {
        let Some(prepared) = self.prepared.as_ref() else {
            return Err(PipelineError::Config(
                "the request has not been processed yet".to_string(),
            ));
        };
        let result = crate::forecast::forecast(&prepared.series, &self.config)?;
        self.state = RunState::Forecasted;
        Ok(self.result.insert(result))
    }

    /// `process` followed by `forecast`.
    pub fn run(&mut self, bytes: &[u8]) -> Result<&ForecastResult, PipelineError> {
        self.process(bytes)?;
        self.forecast()
    }
}

/// Run a complete request. Never panics and never returns a raw error.
pub fn run_request(bytes: &[u8], config: &ForecastConfig) -> ForecastResponse {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut job = ForecastJob::new(config.clone());
        job.run(bytes).cloned()
    }));

    let result = outcome.unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "internal failure".to_string());
        Err(PipelineError::Unknown(message))
    });

    if let Err(e) = &result {
        tracing::warn!(kind = e.kind(), "forecast request failed: {e}");
    }
    result.into()
}

/// Decode and classify an upload without forecasting.
pub fn detect_columns(bytes: &[u8]) -> Result<Detection, PipelineError> {
    let decoded = decode(bytes)?;
    let selection = classify(&decoded.table, None, None);
    Ok(Detection {
        encoding: decoded.encoding,
        delimiter: delimiter_label(decoded.delimiter),
        rows: decoded.table.row_count(),
        skipped_lines: decoded.skipped_lines,
        selection,
    })
}
