use thiserror::Error;

/// Failures of the I/O shell around the report pipeline. The pipeline
/// itself is total and never produces one of these.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported input {path}: {reason}")]
    UnsupportedInput { path: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
