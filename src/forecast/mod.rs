//! Rolling quantile forecasting.
//!
//! Turns a return series into per-index strike forecasts:
//! - Empirical type-7 quantiles over an expanding history prefix
//! - Strict no-look-ahead: index i sees returns strictly before i
//! - Parallel evaluation with a deterministic merge by index
//! - Strike projection from forecast quantiles and the reference price

pub mod estimator;
pub mod quantile;
pub mod strikes;

pub use estimator::{QuantileForecast, RollingQuantileEstimator, MIN_PREFIX_OBSERVATIONS};
pub use quantile::empirical_quantile;
pub use strikes::{StrikePair, StrikeProjector};
