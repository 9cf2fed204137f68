//! Error statistics over residual ranges.

use crate::error::{ArmaError, Result};

/// Sum of squared residuals.
pub fn sse(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// Mean squared residual.
///
/// # Errors
/// An empty range has no mean; the statistic is undefined rather than 0 or
/// NaN.
pub fn mse(residuals: &[f64]) -> Result<f64> {
    if residuals.is_empty() {
        return Err(ArmaError::UndefinedStatistic(
            "mean squared error over an empty index range",
        ));
    }
    Ok(sse(residuals) / residuals.len() as f64)
}

/// Root mean squared residual.
pub fn rmse(residuals: &[f64]) -> Result<f64> {
    Ok(mse(residuals)?.sqrt())
}
