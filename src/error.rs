use thiserror::Error;

/// Failure kinds of the ingest → preprocess → forecast pipeline.
///
/// Every variant carries enough context to tell the caller what to change
/// (a different file, different columns, more history).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Could not read the uploaded file: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No valid dates found in column '{0}'.")]
    NoValidDates(String),

    #[error("No numeric values found in target column '{0}'.")]
    NoValidTarget(String),

    #[error("Insufficient data: need at least 2 distinct periods after resampling, got {0}.")]
    InsufficientData(usize),

    #[error("Insufficient training data: need at least 2 training points, got {0}.")]
    InsufficientTrainingData(usize),

    #[error("Forecast model failed: {0}")]
    Model(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl PipelineError {
    /// Stable machine-readable tag for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "decode_failure",
            PipelineError::Config(_) => "config_error",
            PipelineError::NoValidDates(_) => "no_valid_dates",
            PipelineError::NoValidTarget(_) => "no_valid_target",
            PipelineError::InsufficientData(_) => "insufficient_data",
            PipelineError::InsufficientTrainingData(_) => "insufficient_training_data",
            PipelineError::Model(_) => "model_failure",
            PipelineError::Unknown(_) => "unknown",
        }
    }

    /// Process exit code used by the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Decode(_) | PipelineError::Config(_) => 2,
            PipelineError::NoValidDates(_)
            | PipelineError::NoValidTarget(_)
            | PipelineError::InsufficientData(_)
            | PipelineError::InsufficientTrainingData(_) => 3,
            PipelineError::Model(_) | PipelineError::Unknown(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_exit_codes() {
        let err: AppError = PipelineError::Config("same column".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Invalid configuration: same column");

        let err: AppError = PipelineError::InsufficientData(1).into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = PipelineError::Model("singular".to_string()).into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn kinds_are_snake_case_tags() {
        assert_eq!(PipelineError::NoValidDates("ds".into()).kind(), "no_valid_dates");
        assert_eq!(PipelineError::InsufficientTrainingData(1).kind(), "insufficient_training_data");
    }
}
