//! # Error Types
//!
//! Domain-specific error types for branchbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  branchbook-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  branchbook-db errors (separate crate)                                 │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What HTTP clients see (status + message)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (memo, status, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant is a client error: the request was well-formed but the
/// current state of the aggregate does not allow it. Nothing is written when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order can only be edited while nothing has been delivered.
    #[error("order {memo_no} is {status}; only pending orders can be updated")]
    OrderNotPending { memo_no: String, status: String },

    /// Deliveries are only accepted while an order is pending or partial.
    #[error("order {memo_no} is {status}; no further deliveries are accepted")]
    OrderClosed { memo_no: String, status: String },

    /// Returned sales are immutable.
    #[error("sale {memo_no} has been returned and cannot be changed")]
    SaleReturned { memo_no: String },

    /// A delivery payment would push received above the order total.
    ///
    /// ## User Workflow
    /// ```text
    /// Order total 100, received 40
    ///      │
    ///      ▼
    /// Deliver with payment 70
    ///      │
    ///      ▼
    /// due = 100 - 40 - 70 = -10  → DeliveryExceedsDue { due: 60, .. }
    /// ```
    #[error("payment {amount} exceeds the outstanding due {due}")]
    DeliveryExceedsDue { due: Money, amount: Money },

    /// A delivery would deliver more items than were ordered.
    #[error("cannot deliver {requested} items; only {remaining} remain")]
    DeliveryExceedsItems { remaining: i64, requested: i64 },

    /// `(memo_no, branch_id)` already exists.
    #[error("duplicate memo number not allowed")]
    DuplicateMemo,

    /// A directory record still referenced by orders, sales, purchases or
    /// payroll cannot be deleted.
    #[error("{entity} {id} is still referenced and cannot be deleted")]
    InUse { entity: String, id: i64 },

    /// Report type outside `daily|weekly|monthly|yearly|all`.
    #[error("invalid report type: {0}")]
    InvalidReportType(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing, zero or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A list must contain at least one element.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn negative(field: &str) -> Self {
        ValidationError::Negative {
            field: field.to_string(),
        }
    }

    pub fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
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

    #[test]
    fn test_error_messages() {
        let err = CoreError::DeliveryExceedsDue {
            due: Money::from_cents(6000),
            amount: Money::from_cents(7000),
        };
        assert_eq!(
            err.to_string(),
            "payment 70.00 exceeds the outstanding due 60.00"
        );

        assert_eq!(
            CoreError::DuplicateMemo.to_string(),
            "duplicate memo number not allowed"
        );

        let in_use = CoreError::InUse {
            entity: "Supplier".to_string(),
            id: 4,
        };
        assert_eq!(in_use.to_string(), "Supplier 4 is still referenced and cannot be deleted");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("branch_id").to_string(),
            "branch_id is required"
        );

        let err = ValidationError::OutOfRange {
            field: "received_amount".to_string(),
            min: 0,
            max: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "received_amount must be between 0 and 10000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("items").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "items is required");
    }
}
