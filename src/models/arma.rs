//! ARMA model specification, estimation, and forecasting.
//!
//! Estimation is conditional least squares on lagged features: raw-value
//! lags for the AR part and residual lags for the MA part. When q > 0 the
//! residual lags are bootstrapped from an interim pure-AR stage fitted on
//! the same training window, after which the joint model is estimated in a
//! single solve. Fitting returns an immutable [`ArmaFit`] record; the input
//! series is never mutated.

use crate::core::{ForecastPath, Observation, ObservationSeries};
use crate::error::{ArmaError, Result};
use crate::metrics;
use crate::solver::{LeastSquares, OlsSolver};

/// ARMA model order specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmaSpec {
    /// AR order (number of raw-value lags).
    pub p: usize,
    /// MA order (number of residual lags).
    pub q: usize,
}

impl ArmaSpec {
    /// Create a new specification.
    pub fn new(p: usize, q: usize) -> Self {
        Self { p, q }
    }

    /// The larger of the two orders; observations below this index never
    /// enter the estimation sample.
    pub fn max_order(&self) -> usize {
        self.p.max(self.q)
    }

    /// Total number of estimated parameters (intercept + AR + MA).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }
}

/// Estimated coefficient set: intercept first, then AR, then MA.
#[derive(Debug, Clone, PartialEq)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
}

impl Coefficients {
    /// Split a solver solution vector into intercept, AR, and MA parts.
    fn from_solution(beta: Vec<f64>, p: usize, q: usize) -> Result<Self> {
        if beta.len() != p + q + 1 {
            return Err(ArmaError::Estimation(format!(
                "solver returned {} coefficients, expected {}",
                beta.len(),
                p + q + 1
            )));
        }
        Ok(Self {
            intercept: beta[0],
            ar: beta[1..1 + p].to_vec(),
            ma: beta[1 + p..].to_vec(),
        })
    }

    /// Linear prediction from explicit lag vectors, most-recent first.
    fn predict_from(&self, prev_values: &[f64], prev_errors: &[f64]) -> f64 {
        let mut pred = self.intercept;
        for (coef, lag) in self.ar.iter().zip(prev_values) {
            pred += coef * lag;
        }
        for (coef, lag) in self.ma.iter().zip(prev_errors) {
            pred += coef * lag;
        }
        pred
    }

    /// Linear prediction from the lag vectors stored on an observation.
    fn predict(&self, obs: &Observation) -> f64 {
        self.predict_from(
            obs.prev_values().unwrap_or(&[]),
            obs.prev_errors().unwrap_or(&[]),
        )
    }
}

/// ARMA(p, q) model.
///
/// The model itself is just the order; [`ArmaModel::fit`] produces the
/// estimated [`ArmaFit`]. A pure AR or MA model is the same machinery with
/// the other order set to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmaModel {
    spec: ArmaSpec,
}

impl ArmaModel {
    /// Create an ARMA(p, q) model.
    pub fn new(p: usize, q: usize) -> Self {
        Self {
            spec: ArmaSpec::new(p, q),
        }
    }

    /// Create a pure AR(p) model.
    pub fn ar(p: usize) -> Self {
        Self::new(p, 0)
    }

    /// Create a pure MA(q) model.
    pub fn ma(q: usize) -> Self {
        Self::new(0, q)
    }

    /// The order specification.
    pub fn spec(&self) -> ArmaSpec {
        self.spec
    }

    /// Fit with the bundled OLS solver.
    pub fn fit(&self, series: &ObservationSeries, train_fraction: f64) -> Result<ArmaFit> {
        self.fit_with(series, train_fraction, &OlsSolver::new())
    }

    /// Fit against an arbitrary least-squares capability.
    ///
    /// `train_fraction` selects the leading share of the series used for
    /// estimation; the remainder is the hold-out window. Estimation rows are
    /// drawn from `[max(p, q), n_train)`, predictions and residuals are
    /// produced for every index >= max(p, q), and train/test error
    /// statistics are computed over the disjoint windows
    /// `[max(p, q), n_train)` and `[n_train, n)`.
    pub fn fit_with(
        &self,
        series: &ObservationSeries,
        train_fraction: f64,
        solver: &dyn LeastSquares,
    ) -> Result<ArmaFit> {
        series.ensure_non_empty()?;
        if !(train_fraction > 0.0 && train_fraction <= 1.0) {
            return Err(ArmaError::InvalidConfiguration(format!(
                "train fraction must be in (0, 1], got {train_fraction}"
            )));
        }

        let n = series.len();
        let n_train = (train_fraction * n as f64).round() as usize;
        let p = self.spec.p;
        let q = self.spec.q;
        let max_pq = self.spec.max_order();

        if max_pq >= n_train {
            return Err(ArmaError::InsufficientData {
                needed: max_pq + 1,
                got: n_train,
            });
        }

        let with_values = series.with_value_lags(p)?;

        // MA lags require residuals below every estimation row. They are
        // bootstrapped from an interim pure-AR stage over the same training
        // window; indices below max(p, q) stay at residual 0 and never
        // enter the sample.
        let working = if q > 0 {
            let interim = estimate(&with_values, p, 0, p, n_train, solver)?;
            let mut staged = with_values;
            for i in p..n {
                let residual = match staged.get(i) {
                    Some(obs) => obs.value() - interim.predict(obs),
                    None => continue,
                };
                if let Some(obs) = staged.get_mut(i) {
                    obs.set_residual(residual);
                }
            }
            for i in 0..max_pq {
                if let Some(obs) = staged.get_mut(i) {
                    obs.set_residual(0.0);
                }
            }
            staged.with_error_lags(q)?
        } else {
            with_values.with_error_lags(q)?
        };

        let coefficients = estimate(&working, p, q, max_pq, n_train, solver)?;

        let mut fitted = working;
        for i in max_pq..n {
            let prediction = match fitted.get(i) {
                Some(obs) => coefficients.predict(obs),
                None => continue,
            };
            if let Some(obs) = fitted.get_mut(i) {
                obs.set_prediction(prediction);
            }
        }

        let train_residuals = fitted.residual_window(max_pq, n_train);
        let test_residuals = fitted.residual_window(n_train, n);

        let train_sse = metrics::sse(&train_residuals);
        let train_mse = metrics::mse(&train_residuals)?;
        let test_sse = metrics::sse(&test_residuals);
        let test_mse = if test_residuals.is_empty() {
            None
        } else {
            Some(metrics::mse(&test_residuals)?)
        };

        Ok(ArmaFit {
            spec: self.spec,
            n_train,
            coefficients,
            train_sse,
            train_mse,
            test_sse,
            test_mse,
            fitted,
        })
    }
}

/// Solve one least-squares stage over rows `[start, end)` of `series`,
/// using the first `p` value lags and `q` error lags as predictors.
fn estimate(
    series: &ObservationSeries,
    p: usize,
    q: usize,
    start: usize,
    end: usize,
    solver: &dyn LeastSquares,
) -> Result<Coefficients> {
    let mut response = Vec::with_capacity(end - start);
    let mut rows = Vec::with_capacity(end - start);

    for obs in &series.observations()[start..end] {
        response.push(obs.value());
        let mut row = Vec::with_capacity(p + q);
        row.extend_from_slice(obs.prev_values().unwrap_or(&[]));
        row.extend_from_slice(obs.prev_errors().unwrap_or(&[]));
        rows.push(row);
    }

    Coefficients::from_solution(solver.solve(&response, &rows)?, p, q)
}

/// Immutable result of one ARMA estimation.
///
/// Owns the coefficient vectors, the error statistics, and the fitted
/// series (observations with lag features, predictions, and residuals
/// populated). Forecasting reads from this record without mutating it.
#[derive(Debug, Clone)]
pub struct ArmaFit {
    spec: ArmaSpec,
    n_train: usize,
    coefficients: Coefficients,
    train_sse: f64,
    train_mse: f64,
    test_sse: f64,
    test_mse: Option<f64>,
    fitted: ObservationSeries,
}

impl ArmaFit {
    /// The fitted order specification.
    pub fn spec(&self) -> ArmaSpec {
        self.spec
    }

    /// Number of observations in the training window.
    pub fn n_train(&self) -> usize {
        self.n_train
    }

    /// Estimated intercept.
    pub fn intercept(&self) -> f64 {
        self.coefficients.intercept
    }

    /// Estimated AR coefficients, lag 1 first.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    /// Estimated MA coefficients, lag 1 first.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    /// Sum of squared residuals over the training window.
    pub fn train_sse(&self) -> f64 {
        self.train_sse
    }

    /// Sum of squared residuals over the hold-out window (0 when the
    /// hold-out window is empty; see [`ArmaFit::test_mse`]).
    pub fn test_sse(&self) -> f64 {
        self.test_sse
    }

    /// Mean squared residual over the training window.
    pub fn train_mse(&self) -> f64 {
        self.train_mse
    }

    /// Mean squared residual over the hold-out window.
    ///
    /// # Errors
    /// `UndefinedStatistic` when the model was fitted with the full series
    /// as training data and no hold-out window exists.
    pub fn test_mse(&self) -> Result<f64> {
        self.test_mse
            .ok_or(ArmaError::UndefinedStatistic("test MSE without a hold-out window"))
    }

    /// The fitted series: lag features, predictions, and residuals
    /// populated for every index at or above max(p, q).
    pub fn fitted_series(&self) -> &ObservationSeries {
        &self.fitted
    }

    /// Residuals in index order (0 below max(p, q)).
    pub fn residuals(&self) -> Vec<f64> {
        self.fitted.residuals()
    }

    /// Forecast `horizon` steps past the end of the fitted series.
    ///
    /// Each step appends a synthetic observation, derives its lag vectors
    /// from the already-extended sequence (raw values for AR lags, stored
    /// residuals for MA lags; synthetic observations keep residual 0), and
    /// writes the prediction back as that observation's value so later
    /// steps lag against it. Strictly sequential; the fitted series itself
    /// is not modified.
    pub fn forecast(&self, horizon: usize) -> Result<ForecastPath> {
        let mut working = self.fitted.clone();
        let history_len = working.len();

        for _ in 0..horizon {
            let index = working.len();
            let prev_values = working.value_lags_before(index, self.spec.p);
            let prev_errors = working.error_lags_before(index, self.spec.q);
            let prediction = self.coefficients.predict_from(&prev_values, &prev_errors);

            working.push_value(prediction);
            if let Some(obs) = working.get_mut(index) {
                obs.set_prev_values(prev_values);
                obs.set_prev_errors(prev_errors);
                obs.set_prediction(prediction);
                obs.set_residual(0.0);
            }
        }

        Ok(ForecastPath::new(working, history_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Noise-free AR(1) recursion: value[i] = 2 + 0.5 * value[i-1].
    fn ar1_series(n: usize) -> ObservationSeries {
        let mut values = vec![10.0];
        for i in 1..n {
            values.push(2.0 + 0.5 * values[i - 1]);
        }
        ObservationSeries::from_values(&values)
    }

    fn five_point_series() -> ObservationSeries {
        ObservationSeries::from_values(&[10.0, 12.0, 11.0, 13.0, 14.0])
    }

    #[test]
    fn ar1_recovers_generating_coefficients() {
        let series = ar1_series(20);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();

        assert_relative_eq!(fit.intercept(), 2.0, epsilon = 1e-6);
        assert_eq!(fit.ar_coefficients().len(), 1);
        assert_relative_eq!(fit.ar_coefficients()[0], 0.5, epsilon = 1e-6);
        assert!(fit.ma_coefficients().is_empty());
        assert!(fit.train_sse() < 1e-12);
    }

    #[test]
    fn five_point_scenario_lags_and_residuals() {
        let series = five_point_series();
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();

        let fitted = fit.fitted_series();
        assert_eq!(fitted.get(4).unwrap().prev_values(), Some(&[13.0][..]));
        assert_eq!(fitted.get(0).unwrap().residual(), 0.0);
        assert!(fitted.get(0).unwrap().prediction().is_none());
        assert!(fitted.get(4).unwrap().prediction().is_some());
    }

    #[test]
    fn residuals_below_max_order_are_zero_and_sse_matches() {
        let series = ObservationSeries::from_values(&[
            3.0, 7.0, 4.0, 9.0, 6.0, 8.0, 5.0, 10.0, 7.0, 11.0, 6.0, 9.0,
        ]);
        let fit = ArmaModel::new(2, 1).fit(&series, 1.0).unwrap();
        let max_pq = fit.spec().max_order();

        let residuals = fit.residuals();
        for r in &residuals[..max_pq] {
            assert_eq!(*r, 0.0);
        }
        let expected: f64 = residuals[max_pq..].iter().map(|r| r * r).sum();
        assert_relative_eq!(fit.train_sse(), expected, epsilon = 1e-12);
    }

    #[test]
    fn fitting_twice_is_deterministic() {
        let series = ObservationSeries::from_values(&[
            5.0, 6.5, 5.5, 7.0, 6.0, 7.5, 6.5, 8.0, 7.0, 8.5, 7.5, 9.0,
        ]);
        let model = ArmaModel::new(1, 1);
        let first = model.fit(&series, 1.0).unwrap();
        let second = model.fit(&series, 1.0).unwrap();

        assert_eq!(first.intercept(), second.intercept());
        assert_eq!(first.ar_coefficients(), second.ar_coefficients());
        assert_eq!(first.ma_coefficients(), second.ma_coefficients());
        assert_eq!(first.train_sse(), second.train_sse());
    }

    #[test]
    fn full_train_split_has_no_test_mse() {
        let series = ar1_series(15);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();

        assert_eq!(fit.n_train(), 15);
        assert_eq!(fit.test_sse(), 0.0);
        assert!(matches!(
            fit.test_mse(),
            Err(ArmaError::UndefinedStatistic(_))
        ));
        assert!(fit.train_mse().is_finite());
    }

    #[test]
    fn split_statistics_cover_disjoint_windows() {
        let values: Vec<f64> = (0..50)
            .map(|i| 20.0 + 0.3 * i as f64 + ((i * 7) % 5) as f64 * 0.4)
            .collect();
        let series = ObservationSeries::from_values(&values);
        let fit = ArmaModel::ar(2).fit(&series, 0.8).unwrap();

        assert_eq!(fit.n_train(), 40);
        let residuals = fit.residuals();
        let train_expected: f64 = residuals[2..40].iter().map(|r| r * r).sum();
        let test_expected: f64 = residuals[40..].iter().map(|r| r * r).sum();
        assert_relative_eq!(fit.train_sse(), train_expected, epsilon = 1e-12);
        assert_relative_eq!(fit.test_sse(), test_expected, epsilon = 1e-12);
        assert_relative_eq!(
            fit.test_mse().unwrap(),
            test_expected / 10.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn intercept_only_model_fits_the_mean() {
        let series = ObservationSeries::from_values(&[4.0, 6.0, 5.0, 7.0, 8.0]);
        let fit = ArmaModel::new(0, 0).fit(&series, 1.0).unwrap();

        assert_relative_eq!(fit.intercept(), 6.0, epsilon = 1e-10);
        assert!(fit.ar_coefficients().is_empty());
        assert!(fit.ma_coefficients().is_empty());
        for obs in fit.fitted_series().observations() {
            assert_relative_eq!(obs.prediction().unwrap(), 6.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn pure_ma_model_estimates_q_coefficients() {
        let values: Vec<f64> = (0..30)
            .map(|i| 12.0 + ((i * 3) % 7) as f64 * 0.5)
            .collect();
        let series = ObservationSeries::from_values(&values);
        let fit = ArmaModel::ma(2).fit(&series, 1.0).unwrap();

        assert!(fit.ar_coefficients().is_empty());
        assert_eq!(fit.ma_coefficients().len(), 2);
        assert!(fit.train_sse().is_finite());
    }

    #[test]
    fn invalid_train_fraction_is_rejected() {
        let series = five_point_series();
        for fraction in [0.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                ArmaModel::ar(1).fit(&series, fraction),
                Err(ArmaError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn order_at_or_above_train_window_is_rejected() {
        let series = five_point_series();
        assert!(matches!(
            ArmaModel::ar(5).fit(&series, 1.0),
            Err(ArmaError::InsufficientData { needed: 6, got: 5 })
        ));
        // A small train fraction shrinks the window below the order.
        assert!(matches!(
            ArmaModel::new(2, 1).fit(&series, 0.4),
            Err(ArmaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn too_few_estimation_rows_fail_in_the_solver() {
        // n_train - max_pq = 2 rows for 2 predictors.
        let series = ObservationSeries::from_values(&[1.0, 2.0, 4.0, 3.0]);
        assert!(matches!(
            ArmaModel::ar(2).fit(&series, 1.0),
            Err(ArmaError::Estimation(_))
        ));
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = ObservationSeries::from_values(&[]);
        assert!(matches!(
            ArmaModel::ar(1).fit(&series, 1.0),
            Err(ArmaError::EmptyData)
        ));
    }

    #[test]
    fn forecast_zero_horizon_is_empty() {
        let series = ar1_series(15);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();
        let path = fit.forecast(0).unwrap();

        assert!(path.is_empty());
        assert_eq!(path.full_series().len(), 15);
    }

    #[test]
    fn one_step_forecast_lags_only_history() {
        let series = ar1_series(15);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();
        let path = fit.forecast(1).unwrap();

        assert_eq!(path.horizon(), 1);
        let step = &path.generated()[0];
        assert_eq!(step.index(), 15);
        let last_value = series.get(14).unwrap().value();
        assert_eq!(step.prev_values(), Some(&[last_value][..]));

        let expected = fit.intercept() + fit.ar_coefficients()[0] * last_value;
        assert_relative_eq!(step.value(), expected, epsilon = 1e-12);
        assert_eq!(step.residual(), 0.0);
        assert_eq!(step.prediction(), Some(step.value()));
    }

    #[test]
    fn multi_step_forecast_feeds_predictions_back() {
        let series = ar1_series(15);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();
        let path = fit.forecast(3).unwrap();

        let c = fit.intercept();
        let phi = fit.ar_coefficients()[0];
        let mut last = series.get(14).unwrap().value();
        for step in path.generated() {
            let expected = c + phi * last;
            assert_relative_eq!(step.value(), expected, epsilon = 1e-10);
            last = step.value();
        }
        assert_eq!(path.full_series().len(), 18);
    }

    #[test]
    fn forecast_does_not_mutate_the_fit() {
        let series = ar1_series(15);
        let fit = ArmaModel::ar(1).fit(&series, 1.0).unwrap();
        let before = fit.fitted_series().clone();

        let _ = fit.forecast(5).unwrap();
        assert_eq!(fit.fitted_series(), &before);
    }

    #[test]
    fn arma_forecast_uses_stored_residuals_for_ma_lags() {
        let values: Vec<f64> = (0..25)
            .map(|i| 10.0 + ((i * 5) % 9) as f64 * 0.3)
            .collect();
        let series = ObservationSeries::from_values(&values);
        let fit = ArmaModel::new(1, 1).fit(&series, 1.0).unwrap();
        let path = fit.forecast(2).unwrap();

        // Step 1 lags the last real residual; step 2 lags the synthetic
        // step-1 residual, which is 0 by convention.
        let last_residual = fit.fitted_series().get(24).unwrap().residual();
        let step1 = &path.generated()[0];
        assert_eq!(step1.prev_errors(), Some(&[last_residual][..]));

        let step2 = &path.generated()[1];
        assert_eq!(step2.prev_errors(), Some(&[0.0][..]));
        assert_eq!(step2.prev_values(), Some(&[step1.value()][..]));
    }
}
