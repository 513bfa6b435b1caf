//! Performance aggregation.
//!
//! Reduces the simulated trade collection into per-strategy statistics.
//! Missing entries are excluded, never zero-filled; every summary carries
//! its observation and skip counts so dropped data stays visible.

use serde::{Deserialize, Serialize};

use crate::backtest::SimulatedTrade;
use crate::forecast::empirical_quantile;

/// Summary statistics for one strategy.
///
/// Statistics are `None` when no non-missing observation exists. The
/// variance convention is population (divide by n), like every other
/// dispersion figure in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Non-missing returns that entered the statistics.
    pub observations: usize,
    /// Evaluation indices excluded as missing.
    pub skipped: usize,
    pub mean_return: Option<f64>,
    pub std_dev_return: Option<f64>,
    /// Lower-tail empirical quantile of realized returns (risk proxy).
    pub tail_quantile: Option<f64>,
}

impl PerformanceSummary {
    pub fn skipped_fraction(&self) -> f64 {
        let total = self.observations + self.skipped;
        if total == 0 {
            return 0.0;
        }
        self.skipped as f64 / total as f64
    }
}

/// Realized exercise/assignment frequencies.
///
/// For a calibrated estimator both survival rates approximate the
/// configured confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRateDiagnostic {
    /// Indices where the put outcome was decided.
    pub put_decided: usize,
    /// Decided indices where the put expired out of the money.
    pub put_survived: usize,
    /// Indices where the call outcome was decided.
    pub call_decided: usize,
    /// Decided indices where the call was not assigned.
    pub call_survived: usize,
}

impl HitRateDiagnostic {
    /// Fraction of decided puts that were not exercised.
    pub fn put_survival_rate(&self) -> Option<f64> {
        if self.put_decided == 0 {
            return None;
        }
        Some(self.put_survived as f64 / self.put_decided as f64)
    }

    /// Fraction of decided calls that were not assigned.
    pub fn call_survival_rate(&self) -> Option<f64> {
        if self.call_decided == 0 {
            return None;
        }
        Some(self.call_survived as f64 / self.call_decided as f64)
    }
}

/// Aggregated report over all evaluation indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Total evaluation indices, including skipped ones.
    pub evaluated: usize,
    pub cash_secured_put: PerformanceSummary,
    pub covered_call: PerformanceSummary,
    pub buy_and_hold: PerformanceSummary,
    pub hit_rates: HitRateDiagnostic,
}

impl PerformanceReport {
    pub fn summary(&self) -> String {
        format!(
            "Performance ({} evaluation indices)\n\
             --------------------------------------\n\
             Cash-secured put:  {}\n\
             Covered call:      {}\n\
             Buy and hold:      {}\n\
             \n\
             Put survival rate:  {}\n\
             Call survival rate: {}",
            self.evaluated,
            format_summary(&self.cash_secured_put),
            format_summary(&self.covered_call),
            format_summary(&self.buy_and_hold),
            format_rate(self.hit_rates.put_survival_rate()),
            format_rate(self.hit_rates.call_survival_rate()),
        )
    }
}

fn format_summary(summary: &PerformanceSummary) -> String {
    match (
        summary.mean_return,
        summary.std_dev_return,
        summary.tail_quantile,
    ) {
        (Some(mean), Some(std_dev), Some(tail)) => format!(
            "mean {:.4}%, std {:.4}%, tail {:.4}% ({} obs, {} skipped)",
            mean * 100.0,
            std_dev * 100.0,
            tail * 100.0,
            summary.observations,
            summary.skipped
        ),
        _ => format!(
            "no observations ({} skipped)",
            summary.skipped
        ),
    }
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate * 100.0),
        None => "-".to_string(),
    }
}

/// Reduces trade records into a performance report.
pub struct MetricsCalculator {
    drawdown_quantile: f64,
}

impl MetricsCalculator {
    pub fn new(drawdown_quantile: f64) -> Self {
        Self { drawdown_quantile }
    }

    /// Aggregate all strategies and diagnostics over the trade collection.
    pub fn calculate(&self, trades: &[SimulatedTrade]) -> PerformanceReport {
        let put_returns: Vec<Option<f64>> = trades.iter().map(|t| t.put_return).collect();
        let call_returns: Vec<Option<f64>> = trades.iter().map(|t| t.call_return).collect();

        // Buy-and-hold baseline from the raw prices carried on each record,
        // with the same index alignment and missing policy as the
        // strategies.
        let hold_returns: Vec<Option<f64>> = trades
            .iter()
            .map(|t| match (t.reference_price, t.expiry_price) {
                (Some(reference), Some(actual)) if reference > 0.0 => {
                    Some(actual / reference - 1.0)
                }
                _ => None,
            })
            .collect();

        PerformanceReport {
            evaluated: trades.len(),
            cash_secured_put: self.summarize(&put_returns),
            covered_call: self.summarize(&call_returns),
            buy_and_hold: self.summarize(&hold_returns),
            hit_rates: Self::hit_rates(trades),
        }
    }

    /// Mean, population standard deviation and lower-tail quantile over
    /// the non-missing entries.
    fn summarize(&self, returns: &[Option<f64>]) -> PerformanceSummary {
        let defined: Vec<f64> = returns.iter().filter_map(|r| *r).collect();
        let observations = defined.len();
        let skipped = returns.len() - observations;

        if defined.is_empty() {
            return PerformanceSummary {
                observations,
                skipped,
                mean_return: None,
                std_dev_return: None,
                tail_quantile: None,
            };
        }

        let mean = defined.iter().sum::<f64>() / observations as f64;
        let variance = defined.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / observations as f64;

        PerformanceSummary {
            observations,
            skipped,
            mean_return: Some(mean),
            std_dev_return: Some(variance.sqrt()),
            tail_quantile: empirical_quantile(&defined, self.drawdown_quantile),
        }
    }

    fn hit_rates(trades: &[SimulatedTrade]) -> HitRateDiagnostic {
        let mut rates = HitRateDiagnostic {
            put_decided: 0,
            put_survived: 0,
            call_decided: 0,
            call_survived: 0,
        };

        for trade in trades {
            if let Some(exercised) = trade.put_exercised {
                rates.put_decided += 1;
                if !exercised {
                    rates.put_survived += 1;
                }
            }
            if let Some(assigned) = trade.call_assigned {
                rates.call_decided += 1;
                if !assigned {
                    rates.call_survived += 1;
                }
            }
        }

        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trade(
        index: usize,
        reference: Option<f64>,
        actual: Option<f64>,
        put_return: Option<f64>,
        call_return: Option<f64>,
        put_exercised: Option<bool>,
        call_assigned: Option<bool>,
    ) -> SimulatedTrade {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        SimulatedTrade {
            index,
            entry_date: date,
            expiry_date: date,
            reference_price: reference,
            expiry_price: actual,
            put_strike: None,
            call_strike: None,
            put_exercised,
            call_assigned,
            put_return,
            call_return,
        }
    }

    #[test]
    fn test_summary_excludes_missing() {
        let calculator = MetricsCalculator::new(0.025);
        let trades = vec![
            trade(1, Some(100.0), Some(101.0), Some(0.01), Some(0.01), Some(false), Some(false)),
            trade(2, None, None, None, None, None, None),
            trade(3, Some(100.0), Some(103.0), Some(0.03), Some(0.02), Some(false), Some(true)),
        ];

        let report = calculator.calculate(&trades);

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.cash_secured_put.observations, 2);
        assert_eq!(report.cash_secured_put.skipped, 1);
        assert!((report.cash_secured_put.mean_return.unwrap() - 0.02).abs() < 1e-12);
        // Population std over [0.01, 0.03] is 0.01.
        assert!((report.cash_secured_put.std_dev_return.unwrap() - 0.01).abs() < 1e-12);

        assert_eq!(report.buy_and_hold.observations, 2);
        assert!((report.buy_and_hold.mean_return.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_empty_returns_yield_none() {
        let calculator = MetricsCalculator::new(0.025);
        let trades = vec![trade(1, None, None, None, None, None, None)];

        let report = calculator.calculate(&trades);
        assert_eq!(report.covered_call.observations, 0);
        assert_eq!(report.covered_call.mean_return, None);
        assert_eq!(report.covered_call.std_dev_return, None);
        assert_eq!(report.covered_call.tail_quantile, None);
        assert_eq!(report.covered_call.skipped_fraction(), 1.0);
    }

    #[test]
    fn test_hit_rates_count_decided_indices_only() {
        let calculator = MetricsCalculator::new(0.025);
        let trades = vec![
            trade(1, Some(100.0), Some(101.0), Some(0.01), Some(0.01), Some(false), Some(false)),
            trade(2, Some(100.0), Some(90.0), Some(-0.05), Some(-0.09), Some(true), Some(false)),
            trade(3, None, None, None, None, None, None),
            trade(4, Some(100.0), Some(115.0), Some(0.01), Some(0.09), Some(false), Some(true)),
        ];

        let report = calculator.calculate(&trades);
        let rates = report.hit_rates;

        assert_eq!(rates.put_decided, 3);
        assert_eq!(rates.put_survived, 2);
        assert_eq!(rates.call_decided, 3);
        assert_eq!(rates.call_survived, 2);
        assert!((rates.put_survival_rate().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tail_quantile_uses_drawdown_level() {
        let calculator = MetricsCalculator::new(0.5);
        let trades = vec![
            trade(1, None, None, Some(-0.02), None, Some(true), None),
            trade(2, None, None, Some(0.04), None, Some(false), None),
        ];

        let report = calculator.calculate(&trades);
        // Median of [-0.02, 0.04].
        assert!((report.cash_secured_put.tail_quantile.unwrap() - 0.01).abs() < 1e-12);
    }
}
