//! Hit-rate calibration check.
//!
//! A well-calibrated quantile estimator leaves the sold put unexercised
//! (and the sold call unassigned) at roughly the configured confidence
//! level. This check compares an observed survival rate against that level
//! using the normal approximation to the binomial sampling error, so a
//! miscalibrated estimator is distinguishable from ordinary sampling noise.

use statrs::distribution::{ContinuousCDF, Normal};

/// Outcome of comparing an observed survival rate against its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    /// Configured confidence level (expected survival rate).
    pub expected_rate: f64,
    /// Observed survival rate.
    pub observed_rate: f64,
    /// Decided indices behind the observation.
    pub observations: usize,
    /// Standardized deviation of observed from expected.
    pub z_score: f64,
    /// Two-sided p-value under the normal approximation.
    pub p_value: f64,
    /// Whether the deviation stays within the configured tolerance.
    pub consistent: bool,
}

/// Calibration checker with a z-score tolerance.
pub struct CalibrationCheck {
    max_z_score: f64,
}

impl Default for CalibrationCheck {
    fn default() -> Self {
        Self { max_z_score: 3.0 }
    }
}

impl CalibrationCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(max_z_score: f64) -> Self {
        Self { max_z_score }
    }

    /// Compare a survived/decided count against the expected rate.
    /// Returns `None` when nothing was decided or the expected rate is
    /// degenerate (0 or 1 admits no sampling error).
    pub fn check(
        &self,
        expected_rate: f64,
        survived: usize,
        decided: usize,
    ) -> Option<CalibrationReport> {
        if decided == 0 || !(expected_rate > 0.0 && expected_rate < 1.0) {
            return None;
        }

        let observations = decided;
        let observed_rate = survived as f64 / decided as f64;
        let standard_error =
            (expected_rate * (1.0 - expected_rate) / decided as f64).sqrt();
        let z_score = (observed_rate - expected_rate) / standard_error;

        let normal = Normal::new(0.0, 1.0).unwrap();
        let p_value = 2.0 * (1.0 - normal.cdf(z_score.abs()));

        Some(CalibrationReport {
            expected_rate,
            observed_rate,
            observations,
            z_score,
            p_value,
            consistent: z_score.abs() <= self.max_z_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_rate_is_consistent() {
        let check = CalibrationCheck::new();
        let report = check.check(0.95, 950, 1000).unwrap();

        assert_eq!(report.observed_rate, 0.95);
        assert!(report.z_score.abs() < 1e-12);
        assert!((report.p_value - 1.0).abs() < 1e-9);
        assert!(report.consistent);
    }

    #[test]
    fn test_large_deviation_is_inconsistent() {
        let check = CalibrationCheck::new();
        // 80% observed against 95% expected over 1000 trials.
        let report = check.check(0.95, 800, 1000).unwrap();

        assert!(report.z_score < -3.0);
        assert!(report.p_value < 0.01);
        assert!(!report.consistent);
    }

    #[test]
    fn test_small_sample_noise_tolerated() {
        let check = CalibrationCheck::new();
        // 18/20 survived vs expected 0.95: well inside 3 standard errors.
        let report = check.check(0.95, 18, 20).unwrap();
        assert!(report.consistent);
    }

    #[test]
    fn test_degenerate_inputs() {
        let check = CalibrationCheck::new();
        assert!(check.check(0.95, 0, 0).is_none());
        assert!(check.check(0.0, 5, 10).is_none());
        assert!(check.check(1.0, 5, 10).is_none());
    }
}
