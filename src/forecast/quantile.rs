//! Empirical quantile estimation.
//!
//! Linear interpolation between order statistics ("type 7"), the default of
//! conventional statistical software, so quantiles computed here line up
//! with the numbers an analyst would get when cross-checking.

use std::cmp::Ordering;

/// Empirical quantile of `values` at probability `q`, ignoring non-finite
/// entries. Returns `None` when no finite value remains.
pub fn empirical_quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let clamped = q.clamp(0.0, 1.0);
    let pos = clamped * (finite.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;

    if lower == upper {
        Some(finite[lower])
    } else {
        Some(finite[lower] + (finite[upper] - finite[lower]) * (pos - lower as f64))
    }
}
