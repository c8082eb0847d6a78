//! # Store Errors
//!
//! Persistence-layer errors. Business rule violations detected inside a
//! database transaction (insufficient stock, duplicate numbers) get
//! dedicated variants so the orchestration layer can map them back onto
//! checkout recovery paths instead of treating them as fatal.

use thiserror::Error;

/// Persistence failures and commit-time rule violations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row for the given id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Transaction number collided with an existing row.
    ///
    /// With the per-day counter this is not expected in normal
    /// operation; the commit path retries once and then gives up.
    #[error("Transaction number already exists: {number}")]
    DuplicateNumber { number: String },

    /// Compare-and-decrement found less stock than the draft needs.
    /// The enclosing database transaction is rolled back.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Status transition attempted on a row that is not `completed`.
    #[error("Transaction {id} is not in a transitionable status")]
    StatusConflict { id: String },

    /// Input rejected before touching the database.
    #[error("Validation error: {0}")]
    Validation(#[from] essy_core::ValidationError),

    /// Schema migration failure.
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other database error.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether the underlying cause is a UNIQUE constraint violation.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
