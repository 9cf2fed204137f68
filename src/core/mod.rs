//! Core data structures for lag-based time-series modeling.

mod forecast;
mod lags;
mod observation;

pub use forecast::ForecastPath;
pub use observation::{Observation, ObservationSeries};
