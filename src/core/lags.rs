//! Lag-feature derivation over observation sequences.
//!
//! Each derivation pass reads an existing series and returns a new one with
//! the requested lag vectors attached, so callers never observe a partially
//! updated sequence. Error-lag derivation reads the residuals currently
//! stored on the series, which means residuals for earlier indices must have
//! been assigned before error lags for later indices can be built.

use crate::core::observation::ObservationSeries;
use crate::error::{ArmaError, Result};

impl ObservationSeries {
    /// Derive a new series with `prev_values` populated for every
    /// observation at index >= `p`, using the p immediately preceding raw
    /// values, most-recent first. Observations below index `p` keep no lag
    /// vector and must not be used as estimation rows.
    pub fn with_value_lags(&self, p: usize) -> Result<Self> {
        self.ensure_lag_order(p)?;
        let mut derived = self.clone();
        for i in p..self.len() {
            let lags = self.value_lags_before(i, p);
            if let Some(obs) = derived.get_mut(i) {
                obs.set_prev_values(lags);
            }
        }
        Ok(derived)
    }

    /// Derive a new series with `prev_errors` populated for every
    /// observation at index >= `q`, using the q immediately preceding
    /// residuals, most-recent first.
    pub fn with_error_lags(&self, q: usize) -> Result<Self> {
        self.ensure_lag_order(q)?;
        let mut derived = self.clone();
        for i in q..self.len() {
            let lags = self.error_lags_before(i, q);
            if let Some(obs) = derived.get_mut(i) {
                obs.set_prev_errors(lags);
            }
        }
        Ok(derived)
    }

    /// The `k` raw values immediately preceding `index`, most-recent first.
    ///
    /// Callers guarantee `index >= k`.
    pub(crate) fn value_lags_before(&self, index: usize, k: usize) -> Vec<f64> {
        (1..=k)
            .map(|j| self.observations()[index - j].value())
            .collect()
    }

    /// The `k` residuals immediately preceding `index`, most-recent first.
    pub(crate) fn error_lags_before(&self, index: usize, k: usize) -> Vec<f64> {
        (1..=k)
            .map(|j| self.observations()[index - j].residual())
            .collect()
    }

    fn ensure_lag_order(&self, order: usize) -> Result<()> {
        self.ensure_non_empty()?;
        if order >= self.len() {
            return Err(ArmaError::InvalidConfiguration(format!(
                "lag order {} must be smaller than the series length {}",
                order,
                self.len()
            )));
        }
        Ok(())
    }
}
