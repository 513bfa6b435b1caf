//! Rolling (expanding-window) quantile forecasting.
//!
//! For each evaluation index i the estimator computes the put/call return
//! quantiles over the strict prefix `returns[0..i]` — never the entry at i or
//! later. Each index reads an immutable slice and produces one output slot,
//! so the evaluation loop fans out across a rayon worker pool; the ordered
//! collect restores index order regardless of completion order, which keeps
//! runs bit-identical.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::ReturnSeries;

use super::quantile::empirical_quantile;

/// Fewer defined prefix observations than this yields a missing forecast
/// for the index rather than an error; the run continues.
pub const MIN_PREFIX_OBSERVATIONS: usize = 2;

/// Put/call quantile forecast for one evaluation index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileForecast {
    /// Evaluation index the forecast belongs to.
    pub index: usize,
    /// Empirical quantile at 1 - confidence level (lower tail).
    pub put_quantile: f64,
    /// Empirical quantile at the confidence level (upper tail).
    pub call_quantile: f64,
}

/// Expanding-window empirical quantile estimator.
pub struct RollingQuantileEstimator {
    confidence_level: f64,
}

impl RollingQuantileEstimator {
    /// Build an estimator for a validated confidence level in (0, 1).
    pub fn new(confidence_level: f64) -> Self {
        Self { confidence_level }
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Forecast for a single evaluation index from its strict prefix.
    pub fn forecast_at(&self, returns: &ReturnSeries, index: usize) -> Option<QuantileForecast> {
        let defined: Vec<f64> = returns
            .prefix(index)
            .iter()
            .filter_map(|v| *v)
            .collect();

        if defined.len() < MIN_PREFIX_OBSERVATIONS {
            return None;
        }

        let put_quantile = empirical_quantile(&defined, 1.0 - self.confidence_level)?;
        let call_quantile = empirical_quantile(&defined, self.confidence_level)?;

        Some(QuantileForecast {
            index,
            put_quantile,
            call_quantile,
        })
    }

    /// Forecasts for an ordered set of evaluation indices, computed in
    /// parallel and merged back in input order.
    pub fn estimate(
        &self,
        returns: &ReturnSeries,
        evaluation_indices: &[usize],
    ) -> Vec<Option<QuantileForecast>> {
        evaluation_indices
            .par_iter()
            .map(|&index| self.forecast_at(returns, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReturnMode;

    fn returns(values: Vec<Option<f64>>) -> ReturnSeries {
        ReturnSeries::from_raw(1, ReturnMode::Discrete, values)
    }

    #[test]
    fn test_insufficient_history_is_missing() {
        let series = returns(vec![None, Some(0.01), Some(0.02), Some(0.03)]);
        let estimator = RollingQuantileEstimator::new(0.95);

        // Prefixes of indices 0..=2 hold fewer than two defined returns.
        assert!(estimator.forecast_at(&series, 0).is_none());
        assert!(estimator.forecast_at(&series, 1).is_none());
        assert!(estimator.forecast_at(&series, 2).is_none());
        assert!(estimator.forecast_at(&series, 3).is_some());
    }

    #[test]
    fn test_strict_prefix_only() {
        let estimator = RollingQuantileEstimator::new(0.9);
        let base = returns(vec![None, Some(0.01), Some(-0.02), Some(0.03), Some(0.05)]);
        let forecast = estimator.forecast_at(&base, 3).unwrap();

        // Mutating entries at positions >= 3 must not change the forecast.
        let mutated = returns(vec![None, Some(0.01), Some(-0.02), Some(99.0), Some(-99.0)]);
        assert_eq!(estimator.forecast_at(&mutated, 3), Some(forecast));
    }

    #[test]
    fn test_quantile_ordering() {
        let estimator = RollingQuantileEstimator::new(0.95);
        let series = returns((0..50).map(|i| Some(-0.05 + 0.002 * i as f64)).collect());

        let forecast = estimator.forecast_at(&series, 50).unwrap();
        assert!(forecast.put_quantile <= forecast.call_quantile);
        assert!(forecast.put_quantile < 0.0);
        assert!(forecast.call_quantile > 0.0);
    }

    #[test]
    fn test_estimate_preserves_index_order() {
        let estimator = RollingQuantileEstimator::new(0.9);
        let series = returns((0..200).map(|i| Some((i as f64).sin() * 0.02)).collect());

        let indices: Vec<usize> = (5..200).collect();
        let forecasts = estimator.estimate(&series, &indices);

        assert_eq!(forecasts.len(), indices.len());
        for (slot, &index) in forecasts.iter().zip(indices.iter()) {
            let forecast = slot.expect("prefix has enough observations");
            assert_eq!(forecast.index, index);
            assert_eq!(Some(forecast), estimator.forecast_at(&series, index));
        }
    }
}
