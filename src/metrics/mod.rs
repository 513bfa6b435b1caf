//! Performance metrics module.
//!
//! Reduces simulated trades into per-strategy summaries:
//! - Mean and standard deviation of realized returns
//! - Lower-tail quantile at the configured drawdown level
//! - Put/call survival rates vs the configured confidence level
//! - Skipped-index accounting

pub mod calculator;

pub use calculator::{
    HitRateDiagnostic, MetricsCalculator, PerformanceReport, PerformanceSummary,
};
