//! Price file loader.
//!
//! Reads a locally stored daily price history (CSV or parquet) into a
//! `PriceSeries`. Retrieval from a market-data provider happens outside this
//! crate; the expected file is whatever that collaborator wrote to disk, with
//! one row per session:
//! - `date` — session date, `YYYY-MM-DD` string or a native date column
//! - `adj_close` (or `close`) — adjusted closing price; nulls become
//!   explicit missing markers

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{PricePoint, PriceSeries};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loader for daily price files.
pub struct PriceLoader;

impl PriceLoader {
    /// Load a price file into a series labeled with `ticker`.
    pub fn load(path: &str, ticker: &str) -> Result<PriceSeries, LoaderError> {
        let df = Self::read_dataframe(path)?;
        Self::dataframe_to_series(&df, ticker)
    }

    /// Read a CSV or parquet file (by extension) into a DataFrame.
    fn read_dataframe(path: &str) -> Result<DataFrame, LoaderError> {
        if !Path::new(path).exists() {
            return Err(LoaderError::FileNotFound(path.to_string()));
        }

        let lf = if path.ends_with(".parquet") {
            LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
        } else {
            LazyCsvReader::new(path).with_has_header(true).finish()?
        };

        Ok(lf.collect()?)
    }

    /// Convert a (date, price) DataFrame into a validated `PriceSeries`.
    fn dataframe_to_series(df: &DataFrame, ticker: &str) -> Result<PriceSeries, LoaderError> {
        if df.height() == 0 {
            return Err(LoaderError::InvalidData(format!(
                "No rows in price file for {}",
                ticker
            )));
        }

        let dates = Self::date_column(df)?;
        let prices = Self::price_column(df)?;

        if dates.len() != prices.len() {
            return Err(LoaderError::InvalidData(format!(
                "Column length mismatch: {} dates, {} prices",
                dates.len(),
                prices.len()
            )));
        }

        let mut rows: Vec<(NaiveDate, Option<Decimal>)> =
            dates.into_iter().zip(prices).collect();
        rows.sort_by_key(|(date, _)| *date);

        let points = rows
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();

        PriceSeries::new(ticker, points).map_err(|e| LoaderError::InvalidData(e.to_string()))
    }

    /// Extract the `date` column, accepting string or native date dtypes.
    fn date_column(df: &DataFrame) -> Result<Vec<NaiveDate>, LoaderError> {
        let column = df.column("date")?;

        let dates: Vec<NaiveDate> = if let Ok(str_col) = column.str() {
            str_col
                .into_iter()
                .map(|s| {
                    s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                        .ok_or_else(|| {
                            LoaderError::InvalidData("Unparseable date in price file".to_string())
                        })
                })
                .collect::<Result<_, _>>()?
        } else if let Ok(date_col) = column.date() {
            date_col
                .into_iter()
                .map(|d| {
                    d.map(date_from_days).ok_or_else(|| {
                        LoaderError::InvalidData("Null date in price file".to_string())
                    })
                })
                .collect::<Result<_, _>>()?
        } else {
            return Err(LoaderError::InvalidData(
                "date column has unexpected type".to_string(),
            ));
        };

        Ok(dates)
    }

    /// Extract the price column (`adj_close`, falling back to `close`),
    /// keeping nulls as missing markers.
    fn price_column(df: &DataFrame) -> Result<Vec<Option<Decimal>>, LoaderError> {
        let column = df
            .column("adj_close")
            .or_else(|_| df.column("close"))
            .map_err(|_| {
                LoaderError::InvalidData("No adj_close or close column in price file".to_string())
            })?;

        let values = column.cast(&DataType::Float64)?;
        let prices = values
            .f64()?
            .into_iter()
            .map(|p| p.and_then(Decimal::from_f64_retain))
            .collect();

        Ok(prices)
    }
}

/// Convert days since Unix epoch to NaiveDate.
fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(days + 719163).unwrap_or_default()
}
