//! Backtest configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::ReturnMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Confidence level must be inside (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("Horizon must be at least 1 trading session")]
    InvalidHorizon,

    #[error("Backtest window must be at least 1 year")]
    InvalidWindow,

    #[error("Drawdown quantile must be inside (0, 1), got {0}")]
    InvalidDrawdownQuantile(f64),

    #[error("Premium rate must be non-negative, got {0}")]
    InvalidPremiumRate(f64),
}

/// Configuration for a backtest run.
///
/// `confidence_level` and `horizon` carry no defaults: every run states them
/// explicitly (or reads them from a config file). The remaining fields
/// default to the documented values when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Target probability that the sold option expires unexercised.
    pub confidence_level: f64,

    /// Sessions between trade inception and option expiry.
    pub horizon: usize,

    /// Length of the evaluation window, counted back from the latest date.
    #[serde(default = "default_window_years")]
    pub backtest_window_years: u32,

    /// Put premium collected, as a fraction of the put strike.
    #[serde(default = "default_put_premium_rate")]
    pub put_premium_rate: f64,

    /// Call premium collected, as a fraction of the call strike.
    #[serde(default = "default_call_premium_rate")]
    pub call_premium_rate: f64,

    /// Lower-tail quantile reported as the drawdown statistic.
    #[serde(default = "default_drawdown_quantile")]
    pub drawdown_quantile: f64,

    /// Discrete or logarithmic returns.
    #[serde(default)]
    pub return_mode: ReturnMode,
}

fn default_window_years() -> u32 {
    10
}

fn default_put_premium_rate() -> f64 {
    0.0072
}

fn default_call_premium_rate() -> f64 {
    0.0019
}

fn default_drawdown_quantile() -> f64 {
    0.025
}

impl BacktestConfig {
    /// Config with the required parameters and documented defaults for the
    /// rest.
    pub fn new(confidence_level: f64, horizon: usize) -> Self {
        Self {
            confidence_level,
            horizon,
            backtest_window_years: default_window_years(),
            put_premium_rate: default_put_premium_rate(),
            call_premium_rate: default_call_premium_rate(),
            drawdown_quantile: default_drawdown_quantile(),
            return_mode: ReturnMode::default(),
        }
    }

    /// Fatal validation gate; runs before any computation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidConfidenceLevel(self.confidence_level));
        }
        if self.horizon == 0 {
            return Err(ConfigError::InvalidHorizon);
        }
        if self.backtest_window_years == 0 {
            return Err(ConfigError::InvalidWindow);
        }
        if !(self.drawdown_quantile > 0.0 && self.drawdown_quantile < 1.0) {
            return Err(ConfigError::InvalidDrawdownQuantile(self.drawdown_quantile));
        }
        if self.put_premium_rate < 0.0 || !self.put_premium_rate.is_finite() {
            return Err(ConfigError::InvalidPremiumRate(self.put_premium_rate));
        }
        if self.call_premium_rate < 0.0 || !self.call_premium_rate.is_finite() {
            return Err(ConfigError::InvalidPremiumRate(self.call_premium_rate));
        }
        Ok(())
    }
}
