//! Time helpers in the business timezone
//!
//! Day-precision circulation dates (borrow/due/return) are `NaiveDate`
//! interpreted in the library's configured timezone; instants elsewhere
//! are Unix millis via `shared::util::now_millis`.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Today's date in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Default due date: borrow date plus the configured loan period
pub fn default_due_date(borrow_date: NaiveDate, loan_period_days: i64) -> NaiveDate {
    borrow_date + Duration::days(loan_period_days)
}

/// Whole days from `due` to `on`; positive when `on` is later than `due`
pub fn days_late(due: NaiveDate, on: NaiveDate) -> i64 {
    (on - due).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_due_date_adds_loan_period() {
        assert_eq!(default_due_date(d("2025-03-01"), 14), d("2025-03-15"));
    }

    #[test]
    fn test_days_late() {
        assert_eq!(days_late(d("2025-03-15"), d("2025-03-15")), 0);
        assert_eq!(days_late(d("2025-03-15"), d("2025-03-18")), 3);
        assert_eq!(days_late(d("2025-03-15"), d("2025-03-10")), -5);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2025-03-01").is_ok());
        assert!(parse_date("01/03/2025").is_err());
    }
}
