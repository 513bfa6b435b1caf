//! Strike projection.
//!
//! Converts a quantile forecast and the last price observable at forecast
//! time into absolute strike levels. Purely derived: a missing forecast or
//! an unusable reference price yields a missing pair, never an error.

use serde::{Deserialize, Serialize};

use crate::data::ReturnMode;

use super::estimator::QuantileForecast;

/// Absolute strike levels for one evaluation index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikePair {
    pub put_strike: f64,
    pub call_strike: f64,
}

/// Projects quantile forecasts onto price space.
///
/// The mapping matches the return mode the quantiles were estimated in:
/// discrete returns compound as `reference * (1 + q)`, log returns as
/// `reference * exp(q)`. Mixing the two would skew realized exercise rates
/// away from the configured confidence level.
pub struct StrikeProjector {
    mode: ReturnMode,
}

impl StrikeProjector {
    pub fn new(mode: ReturnMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ReturnMode {
        self.mode
    }

    /// Strikes for one index, or `None` when the forecast or reference
    /// price is missing or non-positive.
    pub fn project(
        &self,
        forecast: Option<&QuantileForecast>,
        reference_price: Option<f64>,
    ) -> Option<StrikePair> {
        let forecast = forecast?;
        let reference = reference_price?;
        if reference <= 0.0 {
            return None;
        }

        Some(StrikePair {
            put_strike: self.apply(reference, forecast.put_quantile),
            call_strike: self.apply(reference, forecast.call_quantile),
        })
    }

    fn apply(&self, reference: f64, quantile: f64) -> f64 {
        match self.mode {
            ReturnMode::Discrete => reference * (1.0 + quantile),
            ReturnMode::Logarithmic => reference * quantile.exp(),
        }
    }
}
