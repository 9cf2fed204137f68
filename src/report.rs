//! Reporting-sink interface.
//!
//! The crate hands fitted-model summaries and forecast steps to an external
//! collaborator; how they are rendered is the host's concern.

use crate::core::ForecastPath;
use crate::models::ArmaFit;

/// Flat summary of one fitted model, ready for a reporting sink.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// AR order.
    pub p: usize,
    /// MA order.
    pub q: usize,
    /// Training-window size.
    pub n_train: usize,
    /// Estimated intercept.
    pub intercept: f64,
    /// Estimated AR coefficients, lag 1 first.
    pub ar_coefficients: Vec<f64>,
    /// Estimated MA coefficients, lag 1 first.
    pub ma_coefficients: Vec<f64>,
    /// Training-window sum of squared residuals.
    pub train_sse: f64,
    /// Hold-out sum of squared residuals.
    pub test_sse: f64,
    /// Training-window mean squared residual.
    pub train_mse: f64,
    /// Hold-out mean squared residual; absent without a hold-out window.
    pub test_mse: Option<f64>,
}

impl From<&ArmaFit> for FitSummary {
    fn from(fit: &ArmaFit) -> Self {
        Self {
            p: fit.spec().p,
            q: fit.spec().q,
            n_train: fit.n_train(),
            intercept: fit.intercept(),
            ar_coefficients: fit.ar_coefficients().to_vec(),
            ma_coefficients: fit.ma_coefficients().to_vec(),
            train_sse: fit.train_sse(),
            test_sse: fit.test_sse(),
            train_mse: fit.train_mse(),
            test_mse: fit.test_mse().ok(),
        }
    }
}

/// One forecast step handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStep {
    /// Index of the generated observation.
    pub index: usize,
    /// Generated value.
    pub value: f64,
}

impl ForecastStep {
    /// Extract the steps of a forecast path in step order.
    pub fn from_path(path: &ForecastPath) -> Vec<Self> {
        path.steps()
            .map(|(index, value)| Self { index, value })
            .collect()
    }
}

/// External collaborator receiving fit and forecast results.
pub trait ReportSink {
    /// Record one fitted model.
    fn record_fit(&mut self, summary: &FitSummary);

    /// Record the steps of one forecast.
    fn record_forecast(&mut self, steps: &[ForecastStep]);
}
