//! Error types for the armafit library.

use thiserror::Error;

/// Result type alias for fitting and forecasting operations.
pub type Result<T> = std::result::Result<T, ArmaError>;

/// Errors that can occur during model fitting, forecasting, or order search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmaError {
    /// Input observation sequence is empty.
    #[error("empty observation sequence")]
    EmptyData,

    /// A parameter is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Not enough observations for the requested model order or split.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The least-squares solve could not produce coefficients.
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// A statistic was requested over an empty index range.
    #[error("undefined statistic: {0}")]
    UndefinedStatistic(&'static str),
}
