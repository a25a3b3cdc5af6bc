//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bodega-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures + wrapped CoreError           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller (ErrorKind)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, counts, dates)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::Week;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// These are raised by the ledger and the registries before any row is
/// written, so a caller receiving one knows the store is unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock on hand to record the sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 units in stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// The requested period intersects an existing week.
    ///
    /// `conflicting` is `None` when the overlap check itself failed and the
    /// registry refused the write without knowing which week collides.
    #[error("Period overlaps an existing week{}", describe_conflict(.conflicting))]
    Overlap { conflicting: Option<Week> },

    /// The entity is system-owned and cannot be removed or renamed.
    #[error("{entity} '{name}' is protected and cannot be modified")]
    ProtectedEntity { entity: String, name: String },

    /// The entity still has dependent rows.
    #[error("{entity} has {count} dependent record(s)")]
    HasDependents { entity: String, count: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn describe_conflict(conflicting: &Option<Week>) -> String {
    match conflicting {
        Some(week) => format!(
            " ({} to {}, week {})",
            week.start_date, week.end_date, week.week_number
        ),
        None => String::new(),
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any storage access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// A date range whose start falls after its end.
    #[error("{field}: start {start} is after end {end}")]
    InvalidRange {
        field: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Caller-supplied value disagrees with the stored one.
    #[error("{field} is stale: expected {expected}, got {actual}")]
    Stale {
        field: String,
        expected: i64,
        actual: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 3, requested 5"
        );

        let err = CoreError::HasDependents {
            entity: "Category".to_string(),
            count: 4,
        };
        assert_eq!(err.to_string(), "Category has 4 dependent record(s)");
    }

    #[test]
    fn test_overlap_message_with_and_without_conflict() {
        let week = Week::with_id(3, date(2024, 1, 1), date(2024, 1, 7));
        let err = CoreError::Overlap {
            conflicting: Some(week),
        };
        assert_eq!(
            err.to_string(),
            "Period overlaps an existing week (2024-01-01 to 2024-01-07, week 1)"
        );

        let err = CoreError::Overlap { conflicting: None };
        assert_eq!(err.to_string(), "Period overlaps an existing week");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvalidRange {
            field: "week".to_string(),
            start: date(2024, 1, 8),
            end: date(2024, 1, 1),
        };
        assert_eq!(
            err.to_string(),
            "week: start 2024-01-08 is after end 2024-01-01"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
