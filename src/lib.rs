//! Strikecast - quantile-based strike forecasting and option-selling
//! backtests.
//!
//! # Overview
//!
//! Strikecast forecasts option strike levels from historical return
//! quantiles and backtests two premium-selling strategies (cash-secured
//! put, covered call) against a buy-and-hold baseline:
//!
//! - **No look-ahead**: every forecast uses only returns realized strictly
//!   before its evaluation index
//! - **Deterministic parallelism**: the expanding-window quantile loop fans
//!   out over a rayon pool and merges back in index order
//! - **Explicit missing policy**: unusable indices propagate as missing and
//!   are counted, never zero-filled or fatal
//!
//! # Quick Start
//!
//! ```no_run
//! use strikecast::{
//!     backtest::{BacktestConfig, BacktestEngine},
//!     data::PriceLoader,
//! };
//!
//! let series = PriceLoader::load("data/SPY.csv", "SPY").unwrap();
//!
//! let config = BacktestConfig::new(0.95, 21);
//! let engine = BacktestEngine::new(config);
//! let result = engine.run(&series).unwrap();
//!
//! println!("{}", result.summary());
//! ```
//!
//! # Modules
//!
//! - [`data`]: price/return series types and the price file loader
//! - [`forecast`]: empirical quantiles, rolling estimator, strike projection
//! - [`backtest`]: configuration, trade simulation, engine orchestration
//! - [`metrics`]: per-strategy performance aggregation and hit rates
//! - [`validation`]: input integrity checks and calibration diagnostics

pub mod backtest;
pub mod data;
pub mod forecast;
pub mod metrics;
pub mod validation;

// Re-exports for convenience
pub use backtest::{
    BacktestConfig, BacktestEngine, BacktestResult, ConfigError, EngineError, SimulatedTrade,
    TradeSimulator,
};
pub use data::{
    build_returns, DataError, LoaderError, PriceLoader, PricePoint, PriceSeries, ReturnMode,
    ReturnSeries,
};
pub use forecast::{
    empirical_quantile, QuantileForecast, RollingQuantileEstimator, StrikePair, StrikeProjector,
};
pub use metrics::{HitRateDiagnostic, MetricsCalculator, PerformanceReport, PerformanceSummary};
pub use validation::{CalibrationCheck, CalibrationReport, IntegrityReport, SeriesValidator};
