//! Core data types for the quantile backtester.
//!
//! A `PriceSeries` is the single input to the engine: an ordered sequence of
//! (date, adjusted price) points for one underlying. Non-trading sessions are
//! expected to be gap-filled by the data collaborator before the series is
//! built; a point may still carry an explicit missing marker, which
//! propagates as missing through every downstream stage instead of failing
//! the run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an n-period return is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// `price[i] / price[i-n] - 1`
    Discrete,
    /// `ln(price[i] / price[i-n])`
    Logarithmic,
}

impl Default for ReturnMode {
    fn default() -> Self {
        Self::Discrete
    }
}

impl ReturnMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discrete => "discrete",
            Self::Logarithmic => "logarithmic",
        }
    }
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Price series is empty")]
    EmptySeries,

    #[error("Dates not strictly increasing at position {position}: {previous} then {current}")]
    UnsortedDates {
        position: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Duplicate date {date} at position {position}")]
    DuplicateDate { position: usize, date: NaiveDate },

    #[error("Invalid horizon {horizon} for series of length {series_len}")]
    InvalidHorizon { horizon: usize, series_len: usize },
}

/// One session in a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Adjusted price; `None` is an explicit missing marker.
    pub price: Option<Decimal>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self {
            date,
            price: Some(price),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, price: None }
    }
}

/// An ordered, immutable price series for one underlying.
///
/// Construction validates ordering; the ticker is a label for output only
/// and never participates in computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting unsorted or duplicate dates.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, DataError> {
        if points.is_empty() {
            return Err(DataError::EmptySeries);
        }

        for (position, pair) in points.windows(2).enumerate() {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(DataError::DuplicateDate {
                    position: position + 1,
                    date: current,
                });
            }
            if current < previous {
                return Err(DataError::UnsortedDates {
                    position: position + 1,
                    previous,
                    current,
                });
            }
        }

        Ok(Self {
            ticker: ticker.into(),
            points,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.points.get(index).map(|p| p.date)
    }

    pub fn price(&self, index: usize) -> Option<Decimal> {
        self.points.get(index).and_then(|p| p.price)
    }

    /// Price as `f64`, or `None` when the point is missing or non-positive.
    /// A zero or negative stored price cannot anchor a strike or a return,
    /// so it is treated as missing rather than as a value.
    pub fn price_f64(&self, index: usize) -> Option<f64> {
        let price = self.points.get(index)?.price?;
        let value: f64 = price.try_into().unwrap_or(0.0);
        if value > 0.0 {
            Some(value)
        } else {
            None
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
