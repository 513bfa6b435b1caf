//! Price series integrity checks.
//!
//! Pre-flight validation for raw points before a `PriceSeries` is built:
//! ordering, duplicates, non-positive prices and missing-marker density.
//! The report lists every failed check instead of stopping at the first.

use rust_decimal::Decimal;

use crate::data::PricePoint;

/// Result of a single integrity check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
        }
    }

    pub fn fail(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
        }
    }
}

/// Integrity report for one raw point collection.
#[derive(Debug)]
pub struct IntegrityReport {
    pub total_points: usize,
    pub missing_prices: usize,
    pub checks: Vec<CheckResult>,
}

impl IntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn missing_fraction(&self) -> f64 {
        if self.total_points == 0 {
            return 0.0;
        }
        self.missing_prices as f64 / self.total_points as f64
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "{} points ({} missing, {:.1}%): {}/{} checks passed",
            self.total_points,
            self.missing_prices,
            self.missing_fraction() * 100.0,
            passed,
            self.checks.len()
        )
    }
}

/// Validator for raw price points.
pub struct SeriesValidator;

impl SeriesValidator {
    /// Run all integrity checks.
    pub fn validate(points: &[PricePoint]) -> IntegrityReport {
        let total_points = points.len();
        let missing_prices = points.iter().filter(|p| p.price.is_none()).count();

        let mut checks = Vec::new();
        checks.push(Self::check_non_empty(points));
        checks.push(Self::check_ordering(points));
        checks.push(Self::check_positive_prices(points));

        IntegrityReport {
            total_points,
            missing_prices,
            checks,
        }
    }

    fn check_non_empty(points: &[PricePoint]) -> CheckResult {
        if points.is_empty() {
            CheckResult::fail("non_empty", "series has no points")
        } else {
            CheckResult::pass("non_empty", &format!("{} points", points.len()))
        }
    }

    fn check_ordering(points: &[PricePoint]) -> CheckResult {
        let mut duplicates = 0usize;
        let mut inversions = 0usize;

        for pair in points.windows(2) {
            if pair[1].date == pair[0].date {
                duplicates += 1;
            } else if pair[1].date < pair[0].date {
                inversions += 1;
            }
        }

        if duplicates == 0 && inversions == 0 {
            CheckResult::pass("date_ordering", "dates strictly increasing")
        } else {
            CheckResult::fail(
                "date_ordering",
                &format!("{} duplicate dates, {} inversions", duplicates, inversions),
            )
        }
    }

    fn check_positive_prices(points: &[PricePoint]) -> CheckResult {
        let non_positive = points
            .iter()
            .filter(|p| matches!(p.price, Some(price) if price <= Decimal::ZERO))
            .count();

        if non_positive == 0 {
            CheckResult::pass("positive_prices", "all stored prices positive")
        } else {
            CheckResult::fail(
                "positive_prices",
                &format!("{} non-positive prices", non_positive),
            )
        }
    }
}
