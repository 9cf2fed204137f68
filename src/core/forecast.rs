//! Forecast result structure holding generated observations.

use crate::core::observation::{Observation, ObservationSeries};

/// Result of a multi-step forecast.
///
/// Holds the full extended sequence (history plus generated observations)
/// and remembers where the history ends, so callers can take either the
/// generated steps alone or the whole path.
#[derive(Debug, Clone)]
pub struct ForecastPath {
    series: ObservationSeries,
    history_len: usize,
}

impl ForecastPath {
    pub(crate) fn new(series: ObservationSeries, history_len: usize) -> Self {
        Self {
            series,
            history_len,
        }
    }

    /// Number of generated forecast steps.
    pub fn horizon(&self) -> usize {
        self.series.len() - self.history_len
    }

    /// Check if no steps were generated.
    pub fn is_empty(&self) -> bool {
        self.horizon() == 0
    }

    /// The generated observations alone, in step order.
    pub fn generated(&self) -> &[Observation] {
        &self.series.observations()[self.history_len..]
    }

    /// The full sequence including history.
    pub fn full_series(&self) -> &ObservationSeries {
        &self.series
    }

    /// Consume the path and return the full extended series.
    pub fn into_series(self) -> ObservationSeries {
        self.series
    }

    /// Generated values in step order.
    pub fn values(&self) -> Vec<f64> {
        self.generated().iter().map(|o| o.value()).collect()
    }

    /// `(index, value)` pairs for each generated step, in step order.
    pub fn steps(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.generated().iter().map(|o| (o.index(), o.value()))
    }
}
