//! # Period Rules
//!
//! Weekly periods are closed date intervals. Two rules govern them:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. start_date <= end_date                                             │
//! │                                                                         │
//! │  2. No two stored periods intersect:                                   │
//! │                                                                         │
//! │        A: [=======]                                                     │
//! │        B:         [=======]      A.end == B.start → OVERLAP             │
//! │        C:                  [==]  disjoint          → ok                 │
//! │                                                                         │
//! │     overlap(A, B) ⇔ A.start <= B.end AND A.end >= B.start               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// ISO-8601 week number of `date` (1..=53).
#[inline]
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Closed-interval intersection test.
#[inline]
pub fn periods_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Rejects a range whose start falls after its end.
pub fn validate_period(field: &str, start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidRange {
            field: field.to_string(),
            start,
            end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_week_numbers() {
        assert_eq!(iso_week_number(date(2024, 1, 1)), 1);
        assert_eq!(iso_week_number(date(2024, 12, 30)), 1);
        assert_eq!(iso_week_number(date(2020, 12, 31)), 53);
        assert_eq!(iso_week_number(date(2024, 6, 15)), 24);
    }

    #[test]
    fn test_touching_periods_overlap() {
        assert!(periods_overlap(
            date(2024, 1, 1),
            date(2024, 1, 7),
            date(2024, 1, 7),
            date(2024, 1, 13)
        ));
    }

    #[test]
    fn test_disjoint_and_contained_periods() {
        assert!(!periods_overlap(
            date(2024, 1, 1),
            date(2024, 1, 7),
            date(2024, 1, 8),
            date(2024, 1, 14)
        ));
        assert!(periods_overlap(
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 1, 10),
            date(2024, 1, 12)
        ));
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period("week", date(2024, 1, 1), date(2024, 1, 1)).is_ok());
        assert!(matches!(
            validate_period("week", date(2024, 1, 8), date(2024, 1, 1)),
            Err(ValidationError::InvalidRange { .. })
        ));
    }
}
