//! # Checkout Service
//!
//! Drives the commit of a validated checkout against the store.
//!
//! ## Commit Orchestration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      commit() outcomes                                  │
//! │                                                                         │
//! │  snapshot cart ──► to_draft ──► begin_commit ──► ledger.append          │
//! │                                                      │                  │
//! │            ┌─────────────────┬───────────────────────┤                  │
//! │            ▼                 ▼                       ▼                  │
//! │       success         InsufficientStock        DuplicateNumber          │
//! │            │                 │                       │                  │
//! │       complete()         fail() +              retry append once        │
//! │       clear cart      return_to_review()             │                  │
//! │            │          cart KEPT as-is          still failing?           │
//! │            ▼                 │                 fail(), CommitFailed     │
//! │       Transaction            ▼                 cart KEPT                │
//! │                      Business error                                     │
//! │                                                                         │
//! │       any other store error: fail(), cart KEPT, retry_payment()         │
//! │       remains available on the machine                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is cleared in exactly one place: after the ledger confirms
//! the commit. A failure of any kind leaves the sale fully recoverable.

use tracing::{info, warn};

use essy_core::checkout::Checkout;
use essy_core::types::Transaction;
use essy_store::{Database, StoreError};

use crate::config::PosConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::session::Session;
use crate::state::CartState;

/// Commits validated checkouts and owns the store handle.
#[derive(Clone)]
pub struct CheckoutService {
    db: Database,
    config: PosConfig,
}

impl CheckoutService {
    pub fn new(db: Database, config: PosConfig) -> Self {
        CheckoutService { db, config }
    }

    /// Store configuration in effect.
    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    /// Store handle, for the frontend's catalog queries.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Commits a validated checkout as a sale.
    ///
    /// Requires an active session and a checkout in the Validated state.
    /// On success the machine lands in Committed and the cart is
    /// cleared; on failure the cart is untouched and the machine is left
    /// on a recovery path (see module docs).
    pub async fn commit(
        &self,
        checkout: &mut Checkout,
        cart: &CartState,
        session: &Session,
        notes: Option<String>,
    ) -> CheckoutResult<Transaction> {
        let user = session.current_user()?;

        let snapshot = cart.snapshot();
        let draft = checkout.to_draft(&snapshot, &user.id, &user.full_name, notes)?;
        checkout.begin_commit()?;

        let ledger = self.db.ledger();
        let prefix = self.config.transaction_prefix.as_str();

        let result = match ledger.append(&draft, prefix).await {
            Err(StoreError::DuplicateNumber { number }) => {
                // One retry reallocates a fresh sequence number
                warn!(number = %number, "Transaction number collision, retrying once");
                match ledger.append(&draft, prefix).await {
                    Err(StoreError::DuplicateNumber { number }) => {
                        checkout.fail()?;
                        return Err(CheckoutError::CommitFailed(format!(
                            "transaction number {} collided twice",
                            number
                        )));
                    }
                    other => other,
                }
            }
            other => other,
        };

        match result {
            Ok(transaction) => {
                checkout.complete()?;
                cart.with_cart_mut(|c| c.clear());
                info!(
                    number = %transaction.number,
                    total = %transaction.total,
                    cashier = %transaction.cashier_name,
                    "Sale committed"
                );
                Ok(transaction)
            }
            Err(err @ StoreError::InsufficientStock { .. }) => {
                // Stock changed under us; the cashier must re-review the
                // cart against the current catalog
                checkout.fail()?;
                checkout.return_to_review()?;
                Err(err.into())
            }
            Err(err) => {
                // Transient persistence failure; payment entry is kept
                // so the cashier can retry from AwaitingAmount
                checkout.fail()?;
                Err(err.into())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
