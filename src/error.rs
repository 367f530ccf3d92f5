//! Error types for the forecast_jobs crate

use thiserror::Error;

/// Custom error types for the forecast_jobs crate
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried internally and no error is downgraded to an empty forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The requested category is absent from the aggregated data
    #[error("unknown category: '{0}'")]
    UnknownCategory(String),

    /// The series is too short for the configured seasonal structure
    #[error("insufficient data: series has {len} observations but the model needs at least {required}")]
    InsufficientData { len: usize, required: usize },

    /// The series has zero variance, so differencing yields a singular system
    #[error("degenerate series: all {len} observations are identical")]
    DegenerateSeries { len: usize },

    /// The coefficient optimizer exhausted its iteration budget
    #[error("model failed to converge within {iterations} iterations")]
    ModelConvergence { iterations: usize },

    /// A non-positive forecast horizon was requested
    #[error("invalid horizon: {0} (must be a positive number of months)")]
    InvalidHorizon(usize),

    /// Error from invalid model parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while reading or writing tabular data
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::Csv(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}
