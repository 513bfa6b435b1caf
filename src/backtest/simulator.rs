//! Per-index trade simulation.
//!
//! Given the projected strikes, the reference price at inception and the
//! realized price at expiry, computes the exercise/assignment outcome and
//! the realized return of each selling strategy. The put comparison is
//! strict (`actual < put_strike`) while call assignment is inclusive
//! (`actual >= call_strike`), matching the observed behavior of the
//! strategies being reproduced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forecast::StrikePair;

/// Outcome of one evaluation index.
///
/// Every derived field is optional: an index with unusable inputs carries
/// its dates and whatever was known, and is skipped by aggregation instead
/// of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTrade {
    /// Evaluation index in the source series.
    pub index: usize,
    /// Trade inception date (session before the forecast index).
    pub entry_date: NaiveDate,
    /// Option expiry date, `horizon` sessions after inception.
    pub expiry_date: NaiveDate,
    /// Price at inception; anchors the covered call and buy-and-hold.
    pub reference_price: Option<f64>,
    /// Realized price at expiry.
    pub expiry_price: Option<f64>,
    pub put_strike: Option<f64>,
    pub call_strike: Option<f64>,
    /// Whether the sold put finished in the money.
    pub put_exercised: Option<bool>,
    /// Whether the sold call was assigned.
    pub call_assigned: Option<bool>,
    /// Realized cash-secured put return.
    pub put_return: Option<f64>,
    /// Realized covered call return.
    pub call_return: Option<f64>,
}

impl SimulatedTrade {
    /// True when neither strategy produced a realized return.
    pub fn is_skipped(&self) -> bool {
        self.put_return.is_none() && self.call_return.is_none()
    }
}

/// Computes realized strategy returns for one evaluation index.
pub struct TradeSimulator {
    put_premium_rate: f64,
    call_premium_rate: f64,
}

impl TradeSimulator {
    /// Premium rates are fractions of the respective strike.
    pub fn new(put_premium_rate: f64, call_premium_rate: f64) -> Self {
        Self {
            put_premium_rate,
            call_premium_rate,
        }
    }

    /// Simulate one index. Missing strikes, a missing expiry price, or a
    /// non-positive reference price leave the affected returns missing.
    pub fn simulate(
        &self,
        index: usize,
        entry_date: NaiveDate,
        expiry_date: NaiveDate,
        strikes: Option<StrikePair>,
        reference_price: Option<f64>,
        expiry_price: Option<f64>,
    ) -> SimulatedTrade {
        let mut trade = SimulatedTrade {
            index,
            entry_date,
            expiry_date,
            reference_price,
            expiry_price,
            put_strike: strikes.map(|s| s.put_strike),
            call_strike: strikes.map(|s| s.call_strike),
            put_exercised: None,
            call_assigned: None,
            put_return: None,
            call_return: None,
        };

        let (Some(strikes), Some(actual)) = (strikes, expiry_price) else {
            return trade;
        };

        let put_exercised = actual < strikes.put_strike;
        let call_assigned = actual >= strikes.call_strike;
        trade.put_exercised = Some(put_exercised);
        trade.call_assigned = Some(call_assigned);

        trade.put_return = self.put_return(strikes.put_strike, actual, put_exercised);
        trade.call_return =
            self.call_return(strikes.call_strike, actual, reference_price, call_assigned);

        trade
    }

    /// Cash-secured put: premium kept outright when out of the money,
    /// otherwise the assignment loss net of premium, on strike capital.
    fn put_return(&self, put_strike: f64, actual: f64, exercised: bool) -> Option<f64> {
        if !exercised {
            return Some(self.put_premium_rate);
        }
        if put_strike <= 0.0 {
            return None;
        }
        let premium = self.put_premium_rate * put_strike;
        Some((actual - put_strike + premium) / put_strike)
    }

    /// Covered call: anchored to the reference price at inception since the
    /// underlying is already held; assignment caps the upside at the strike.
    fn call_return(
        &self,
        call_strike: f64,
        actual: f64,
        reference_price: Option<f64>,
        assigned: bool,
    ) -> Option<f64> {
        let reference = reference_price?;
        if reference <= 0.0 {
            return None;
        }
        let premium = self.call_premium_rate * call_strike;
        let settle = if assigned { call_strike } else { actual };
        Some((premium + settle - reference) / reference)
    }
}
