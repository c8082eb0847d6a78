//! # Checkout Orchestration Errors
//!
//! Top of the error chain: business rules from essy-core, persistence
//! from essy-store, plus session concerns that only exist up here.
//!
//! Commit-time `InsufficientStock` from the store is remapped onto its
//! essy-core twin so callers see one business error regardless of
//! whether the cart engine or the database caught it first.

use thiserror::Error;

use essy_core::CoreError;
use essy_store::StoreError;

/// Failures surfaced to the point-of-sale frontend.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No cashier session; log in first.
    #[error("No active session")]
    NotAuthenticated,

    /// The account exists but has been deactivated.
    #[error("Account '{username}' is inactive")]
    AccountInactive { username: String },

    /// The action is gated to managers.
    #[error("'{action}' requires the manager role")]
    NotAuthorized { action: &'static str },

    /// Business rule violation; the checkout recovers, cart untouched.
    #[error(transparent)]
    Business(#[from] CoreError),

    /// Persistence failure outside the business rules.
    #[error("Persistence error: {0}")]
    Store(StoreError),

    /// Commit gave up after the retry budget.
    #[error("Commit failed: {0}")]
    CommitFailed(String),
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => CheckoutError::Business(CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            }),
            other => CheckoutError::Store(other),
        }
    }
}

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_insufficient_stock_becomes_business_error() {
        let err: CheckoutError = StoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(
            err,
            CheckoutError::Business(CoreError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_other_store_errors_stay_persistence() {
        let err: CheckoutError = StoreError::not_found("product", "p-1").into();
        assert!(matches!(err, CheckoutError::Store(_)));
    }
}
