//! # Error Types
//!
//! Domain-specific error types for essy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  essy-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  essy-store errors (separate crate)                                    │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  essy-checkout errors (separate crate)                                 │
//! │  └── CheckoutError    - Commit orchestration failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CheckoutError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Business rule violations preserve cart state; the caller returns
//!    to the prior checkout state and re-prompts

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
///
/// None of these are fatal: recovery is returning to the previous
/// checkout state with the cart untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout cannot start on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product cannot be sold (unavailable or out of stock).
    #[error("Product '{name}' is not sellable")]
    Unsellable { name: String },

    /// Cart line quantity would exceed the per-item ceiling.
    ///
    /// This is a UX limit on the cart; stock sufficiency is a separate
    /// commit-time invariant.
    #[error("Quantity for '{name}' would exceed the maximum of {max}")]
    QuantityLimitExceeded { name: String, max: i64 },

    /// No cart line for the given product.
    #[error("Product {product_id} is not in the cart")]
    ItemNotFound { product_id: String },

    /// Commit-time stock re-validation failed for one line.
    ///
    /// ## User Workflow
    /// ```text
    /// commit()
    ///      │
    ///      ▼
    /// compare-and-decrement stock (requested: 5, available: 3)
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// checkout returns to Reviewing; cart untouched
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cash tendered below the grand total.
    #[error("Insufficient payment: total is {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// Non-cash tender must equal the grand total exactly.
    #[error("Invalid payment amount: {reason}")]
    InvalidAmount { reason: String },

    /// Cart contents changed between review and commit.
    #[error("Cart changed during checkout; cancel and restart from review")]
    CartDrift,

    /// Operation not legal in the current checkout state.
    #[error("Invalid checkout state: expected {expected}, currently {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements; they are
/// surfaced to the caller for re-entry and are never fatal.
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

    /// Invalid format (e.g. a malformed amount string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
        let err = CoreError::InsufficientStock {
            product_id: "p-7".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p-7: available 3, requested 5"
        );

        let err = CoreError::InsufficientPayment {
            total: Money::from_minor(49_500),
            tendered: Money::from_minor(40_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total is Rp 49.500, tendered Rp 40.000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
