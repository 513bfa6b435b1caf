//! Forward return series construction.
//!
//! `ReturnSeries` is aligned index-for-index with its source `PriceSeries`:
//! the value at index i is the n-period return ending at i, so the first n
//! entries are always missing. Entries whose base or current price is missing
//! stay missing instead of aborting the build.

use super::types::{DataError, PriceSeries, ReturnMode};

/// n-period return series aligned with its source price series.
#[derive(Debug, Clone)]
pub struct ReturnSeries {
    horizon: usize,
    mode: ReturnMode,
    values: Vec<Option<f64>>,
}

impl ReturnSeries {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn mode(&self) -> ReturnMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// The strict prefix `[0, end)` of the series. Rolling forecasts read
    /// only this slice, never the entry at `end` or beyond.
    pub fn prefix(&self, end: usize) -> &[Option<f64>] {
        &self.values[..end.min(self.values.len())]
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    #[cfg(test)]
    pub(crate) fn from_raw(horizon: usize, mode: ReturnMode, values: Vec<Option<f64>>) -> Self {
        Self {
            horizon,
            mode,
            values,
        }
    }
}

/// Build the n-period return series for a price series.
///
/// Fails with `InvalidHorizon` when the horizon is zero or not smaller than
/// the series length; pure otherwise.
pub fn build_returns(
    series: &PriceSeries,
    horizon: usize,
    mode: ReturnMode,
) -> Result<ReturnSeries, DataError> {
    let series_len = series.len();
    if horizon == 0 || horizon >= series_len {
        return Err(DataError::InvalidHorizon {
            horizon,
            series_len,
        });
    }

    let mut values = Vec::with_capacity(series_len);
    for index in 0..series_len {
        if index < horizon {
            values.push(None);
            continue;
        }

        let value = match (series.price_f64(index), series.price_f64(index - horizon)) {
            (Some(current), Some(base)) => Some(match mode {
                ReturnMode::Discrete => current / base - 1.0,
                ReturnMode::Logarithmic => (current / base).ln(),
            }),
            _ => None,
        };
        values.push(value);
    }

    Ok(ReturnSeries {
        horizon,
        mode,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::PricePoint;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn series(prices: &[Option<f64>]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                price: p.and_then(Decimal::from_f64_retain),
            })
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    #[test]
    fn test_discrete_returns() {
        let s = series(&[Some(100.0), Some(110.0), Some(99.0)]);
        let returns = build_returns(&s, 1, ReturnMode::Discrete).unwrap();

        assert_eq!(returns.len(), 3);
        assert_eq!(returns.value(0), None);
        assert!((returns.value(1).unwrap() - 0.10).abs() < 1e-12);
        assert!((returns.value(2).unwrap() - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_log_returns() {
        let s = series(&[Some(100.0), Some(110.0)]);
        let returns = build_returns(&s, 1, ReturnMode::Logarithmic).unwrap();
        assert!((returns.value(1).unwrap() - (1.1f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_multi_period_alignment() {
        let s = series(&[Some(100.0), Some(101.0), Some(102.0), Some(120.0)]);
        let returns = build_returns(&s, 3, ReturnMode::Discrete).unwrap();

        assert_eq!(returns.value(0), None);
        assert_eq!(returns.value(2), None);
        assert!((returns.value(3).unwrap() - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_missing_price_propagates() {
        let s = series(&[Some(100.0), None, Some(102.0)]);
        let returns = build_returns(&s, 1, ReturnMode::Discrete).unwrap();

        assert_eq!(returns.value(1), None);
        assert_eq!(returns.value(2), None);
        assert_eq!(returns.defined_count(), 0);
    }

    #[test]
    fn test_invalid_horizon() {
        let s = series(&[Some(100.0), Some(101.0)]);
        assert!(matches!(
            build_returns(&s, 0, ReturnMode::Discrete),
            Err(DataError::InvalidHorizon {
                horizon: 0,
                series_len: 2
            })
        ));
        assert!(matches!(
            build_returns(&s, 2, ReturnMode::Discrete),
            Err(DataError::InvalidHorizon {
                horizon: 2,
                series_len: 2
            })
        ));
    }

    #[test]
    fn test_prefix_is_strict() {
        let s = series(&[Some(100.0), Some(110.0), Some(99.0), Some(105.0)]);
        let returns = build_returns(&s, 1, ReturnMode::Discrete).unwrap();

        let prefix = returns.prefix(2);
        assert_eq!(prefix.len(), 2);
        // Position 2 and beyond must not be visible through prefix(2).
        assert_eq!(prefix.last().copied().flatten(), returns.value(1));
    }
}
