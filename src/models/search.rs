//! Brute-force order selection over a (p, q) candidate grid.

use crate::core::ObservationSeries;
use crate::error::{ArmaError, Result};
use crate::models::arma::{ArmaFit, ArmaModel, ArmaSpec};
use crate::solver::{LeastSquares, OlsSolver};

/// Criterion minimized by the search.
///
/// Chosen from the split: a full training split is ranked by in-sample
/// error, anything else by hold-out error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriterion {
    /// Sum of squared residuals over the training window.
    TrainSse,
    /// Sum of squared residuals over the hold-out window.
    TestSse,
}

/// Exhaustive search over the Cartesian product of candidate orders.
///
/// Every (p, q) pair is fitted with a fresh model; candidates never share
/// state. Enumeration is row-major (p outer, q inner) and a strictly lower
/// criterion value replaces the incumbent, so ties keep the
/// earlier-enumerated candidate.
#[derive(Debug, Clone)]
pub struct OrderSearch {
    p_candidates: Vec<usize>,
    q_candidates: Vec<usize>,
    train_fraction: f64,
}

impl OrderSearch {
    /// Create a search over the given candidate orders and split.
    pub fn new(p_candidates: Vec<usize>, q_candidates: Vec<usize>, train_fraction: f64) -> Self {
        Self {
            p_candidates,
            q_candidates,
            train_fraction,
        }
    }

    /// Run the search with the bundled OLS solver.
    pub fn run(&self, series: &ObservationSeries) -> Result<SearchOutcome> {
        self.run_with(series, &OlsSolver::new())
    }

    /// Run the search against an arbitrary least-squares capability.
    ///
    /// Fails before any fitting when a candidate list is empty, when the
    /// hold-out criterion is selected but the split leaves no hold-out
    /// window, or when any candidate pair's max(p, q) reaches the training
    /// window.
    pub fn run_with(
        &self,
        series: &ObservationSeries,
        solver: &dyn LeastSquares,
    ) -> Result<SearchOutcome> {
        if self.p_candidates.is_empty() || self.q_candidates.is_empty() {
            return Err(ArmaError::InvalidConfiguration(
                "candidate order lists must not be empty".to_string(),
            ));
        }
        series.ensure_non_empty()?;
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(ArmaError::InvalidConfiguration(format!(
                "train fraction must be in (0, 1], got {}",
                self.train_fraction
            )));
        }

        let n = series.len();
        let n_train = (self.train_fraction * n as f64).round() as usize;
        let criterion = if self.train_fraction == 1.0 {
            SelectionCriterion::TrainSse
        } else {
            SelectionCriterion::TestSse
        };
        if criterion == SelectionCriterion::TestSse && n_train >= n {
            return Err(ArmaError::InsufficientData {
                needed: n_train + 1,
                got: n,
            });
        }
        for &p in &self.p_candidates {
            for &q in &self.q_candidates {
                let max_pq = ArmaSpec::new(p, q).max_order();
                if max_pq >= n_train {
                    return Err(ArmaError::InsufficientData {
                        needed: max_pq + 1,
                        got: n_train,
                    });
                }
            }
        }

        let mut best: Option<(ArmaFit, f64)> = None;
        let mut scores = Vec::with_capacity(self.p_candidates.len() * self.q_candidates.len());

        for &p in &self.p_candidates {
            for &q in &self.q_candidates {
                let fit = ArmaModel::new(p, q).fit_with(series, self.train_fraction, solver)?;
                let score = match criterion {
                    SelectionCriterion::TrainSse => fit.train_sse(),
                    SelectionCriterion::TestSse => fit.test_sse(),
                };
                scores.push((fit.spec(), score));

                let replace = match &best {
                    None => true,
                    Some((_, incumbent)) => score < *incumbent,
                };
                if replace {
                    best = Some((fit, score));
                }
            }
        }

        // Candidate lists are non-empty and every fit either succeeded or
        // aborted the search, so a best fit exists here.
        let (best, _) = best.ok_or_else(|| {
            ArmaError::InvalidConfiguration("no candidate produced a fit".to_string())
        })?;

        Ok(SearchOutcome {
            evaluated: scores.len(),
            best,
            criterion,
            scores,
        })
    }
}

/// Result of a brute-force order search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    best: ArmaFit,
    criterion: SelectionCriterion,
    evaluated: usize,
    scores: Vec<(ArmaSpec, f64)>,
}

impl SearchOutcome {
    /// The minimum-criterion fit.
    pub fn best(&self) -> &ArmaFit {
        &self.best
    }

    /// Consume the outcome and return the winning fit.
    pub fn into_best(self) -> ArmaFit {
        self.best
    }

    /// The criterion the grid was ranked by.
    pub fn criterion(&self) -> SelectionCriterion {
        self.criterion
    }

    /// Number of fits attempted (the full grid size).
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Per-candidate scores in enumeration order.
    pub fn scores(&self) -> &[(ArmaSpec, f64)] {
        &self.scores
    }
}
