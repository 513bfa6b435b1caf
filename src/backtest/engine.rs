//! Backtest engine.
//!
//! Orchestrates the pipeline:
//! 1. Validate configuration (fatal errors stop here)
//! 2. Build the n-period return series
//! 3. Derive the evaluation index range (date window, realized outcome)
//! 4. Forecast rolling quantiles (parallel, merged by index)
//! 5. Project strikes and simulate both selling strategies
//! 6. Aggregate per-strategy performance and hit rates
//!
//! The core holds no I/O and no shared mutable state: re-running on the
//! same series and config yields bit-identical results.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::data::{build_returns, DataError, PriceSeries};
use crate::forecast::{RollingQuantileEstimator, StrikeProjector};
use crate::metrics::{MetricsCalculator, PerformanceReport};

use super::config::{BacktestConfig, ConfigError};
use super::simulator::{SimulatedTrade, TradeSimulator};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// Result of a completed backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Ticker label of the input series.
    pub ticker: String,

    /// Configuration used.
    pub config: BacktestConfig,

    /// First trade inception date.
    pub start_date: Option<NaiveDate>,

    /// Last option expiry date.
    pub end_date: Option<NaiveDate>,

    /// One record per evaluation index, in index order.
    pub trades: Vec<SimulatedTrade>,

    /// Aggregated per-strategy statistics and diagnostics.
    pub report: PerformanceReport,
}

impl BacktestResult {
    pub fn summary(&self) -> String {
        format!(
            "Backtest: {} ({} to {})\n\
             Horizon: {} sessions, confidence {:.1}%\n\
             \n\
             {}",
            self.ticker,
            self.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            self.end_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            self.config.horizon,
            self.config.confidence_level * 100.0,
            self.report.summary(),
        )
    }
}

/// The quantile backtest engine.
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the full pipeline over a price series.
    pub fn run(&self, series: &PriceSeries) -> Result<BacktestResult, EngineError> {
        self.config.validate()?;

        let horizon = self.config.horizon;
        let returns = build_returns(series, horizon, self.config.return_mode)?;

        let evaluation = self.evaluation_indices(series);
        info!(
            ticker = series.ticker(),
            sessions = series.len(),
            evaluation_indices = evaluation.len(),
            horizon,
            "starting backtest"
        );

        let estimator = RollingQuantileEstimator::new(self.config.confidence_level);
        let forecasts = estimator.estimate(&returns, &evaluation);

        let projector = StrikeProjector::new(self.config.return_mode);
        let simulator =
            TradeSimulator::new(self.config.put_premium_rate, self.config.call_premium_rate);

        let points = series.points();
        let trades: Vec<SimulatedTrade> = evaluation
            .iter()
            .zip(forecasts.iter())
            .map(|(&index, forecast)| {
                let expiry_index = index + horizon - 1;
                let reference_price = series.price_f64(index - 1);
                let strikes = projector.project(forecast.as_ref(), reference_price);
                simulator.simulate(
                    index,
                    points[index - 1].date,
                    points[expiry_index].date,
                    strikes,
                    reference_price,
                    series.price_f64(expiry_index),
                )
            })
            .collect();

        let calculator = MetricsCalculator::new(self.config.drawdown_quantile);
        let report = calculator.calculate(&trades);

        info!(
            evaluated = report.evaluated,
            skipped = report.cash_secured_put.skipped,
            "backtest complete"
        );

        Ok(BacktestResult {
            ticker: series.ticker().to_string(),
            config: self.config.clone(),
            start_date: trades.first().map(|t| t.entry_date),
            end_date: trades.last().map(|t| t.expiry_date),
            trades,
            report,
        })
    }

    /// Evaluation indices: sessions inside the lookback window whose expiry
    /// (`index + horizon - 1`) falls inside the series and whose reference
    /// session (`index - 1`) exists. The window runs from
    /// `latest - backtest_window_years` up to `horizon` sessions before the
    /// end, so every forecast has a realized outcome.
    fn evaluation_indices(&self, series: &PriceSeries) -> Vec<usize> {
        let len = series.len();
        let horizon = self.config.horizon;
        if len == 0 || horizon >= len {
            return Vec::new();
        }

        let latest = series.points()[len - 1].date;
        let window_start = latest
            .checked_sub_months(Months::new(self.config.backtest_window_years * 12))
            .unwrap_or(NaiveDate::MIN);

        (1..=len - horizon)
            .filter(|&index| series.points()[index].date >= window_start)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn daily_series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint {
                date: start + Duration::days(i as i64),
                price: Decimal::from_f64_retain(p),
            })
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let series = daily_series(&[100.0, 101.0, 102.0, 103.0]);
        let engine = BacktestEngine::new(BacktestConfig::new(1.5, 1));
        assert!(matches!(
            engine.run(&series),
            Err(EngineError::Config(ConfigError::InvalidConfidenceLevel(_)))
        ));
    }

    #[test]
    fn test_horizon_exceeding_series_is_fatal() {
        let series = daily_series(&[100.0, 101.0]);
        let engine = BacktestEngine::new(BacktestConfig::new(0.9, 10));
        assert!(matches!(
            engine.run(&series),
            Err(EngineError::Data(DataError::InvalidHorizon { .. }))
        ));
    }

    #[test]
    fn test_evaluation_range_is_bounded() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.1).collect();
        let series = daily_series(&prices);
        let engine = BacktestEngine::new(BacktestConfig::new(0.9, 5));

        let result = engine.run(&series).unwrap();
        let last = result.trades.last().unwrap();

        // Expiry of the last evaluated index is the final session.
        assert_eq!(last.index + 5 - 1, series.len() - 1);
        assert_eq!(last.expiry_date, series.last_date().unwrap());
        // Trades come back in strict index order.
        for pair in result.trades.windows(2) {
            assert!(pair[0].index < pair[1].index);
        }
    }

    #[test]
    fn test_window_limits_evaluation() {
        // ~3 years of daily points, window of 1 year.
        let prices: Vec<f64> = (0..1100).map(|i| 100.0 + (i % 70) as f64 * 0.2).collect();
        let series = daily_series(&prices);

        let mut config = BacktestConfig::new(0.9, 5);
        config.backtest_window_years = 1;
        let result = BacktestEngine::new(config).run(&series).unwrap();

        let first = result.trades.first().unwrap();
        let latest = series.last_date().unwrap();
        let window_start = latest.checked_sub_months(Months::new(12)).unwrap();
        assert!(series.date(first.index).unwrap() >= window_start);
    }

    #[test]
    fn test_determinism() {
        let prices: Vec<f64> = (0..300)
            .map(|i| 100.0 * (1.0 + 0.001 * ((i * 37 % 17) as f64 - 8.0)))
            .collect();
        let series = daily_series(&prices);
        let engine = BacktestEngine::new(BacktestConfig::new(0.95, 5));

        let first = engine.run(&series).unwrap();
        let second = engine.run(&series).unwrap();

        assert_eq!(first.trades, second.trades);
        assert_eq!(
            first.report.cash_secured_put.mean_return,
            second.report.cash_secured_put.mean_return
        );
    }
}
