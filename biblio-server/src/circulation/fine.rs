//! Fine assessment using rust_decimal for precision
//!
//! Fines accrue per day past due, after an optional grace period. All
//! arithmetic is done in `Decimal`, then converted to `f64` for storage.

use chrono::NaiveDate;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Overdue fine policy: a flat per-day rate after a grace period.
#[derive(Debug, Clone, Copy)]
pub struct FinePolicy {
    /// Fine per day past due
    pub per_day: f64,
    /// Days past due before the fine starts accruing
    pub grace_days: i64,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            per_day: 0.50,
            grace_days: 0,
        }
    }
}

impl FinePolicy {
    /// Fine owed for a borrow due on `due_date`, assessed as of `as_of`.
    ///
    /// Zero when `as_of` is on or before the due date (or inside the
    /// grace period). Returning exactly on the due date never fines.
    pub fn assess(&self, due_date: NaiveDate, as_of: NaiveDate) -> f64 {
        let billable_days = (as_of - due_date).num_days() - self.grace_days;
        if billable_days <= 0 {
            return 0.0;
        }
        to_f64(Decimal::from(billable_days) * to_decimal(self.per_day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_no_fine_on_or_before_due_date() {
        let policy = FinePolicy::default();
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-15")), 0.0);
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-01")), 0.0);
    }

    #[test]
    fn test_per_day_accrual() {
        let policy = FinePolicy {
            per_day: 0.50,
            grace_days: 0,
        };
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-16")), 0.50);
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-25")), 5.0);
    }

    #[test]
    fn test_grace_period() {
        let policy = FinePolicy {
            per_day: 1.0,
            grace_days: 3,
        };
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-18")), 0.0);
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-19")), 1.0);
    }

    #[test]
    fn test_fractional_rate_precision() {
        // 0.1 * 3 must be exactly 0.3, not 0.30000000000000004
        let policy = FinePolicy {
            per_day: 0.1,
            grace_days: 0,
        };
        assert_eq!(policy.assess(d("2025-03-15"), d("2025-03-18")), 0.3);
    }
}
