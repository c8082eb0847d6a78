//! # Transaction History
//!
//! Role-gated views over the ledger: managers see every sale, staff see
//! only their own. Cancellation and refunds are manager actions.

use tracing::info;

use essy_core::types::Transaction;
use essy_store::Database;

use crate::error::{CheckoutError, CheckoutResult};
use crate::session::Session;

/// Ledger queries on behalf of a session.
#[derive(Clone)]
pub struct TransactionHistory {
    db: Database,
}

impl TransactionHistory {
    pub fn new(db: Database) -> Self {
        TransactionHistory { db }
    }

    /// Recent sales visible to this session.
    pub async fn list(&self, session: &Session, limit: i64) -> CheckoutResult<Vec<Transaction>> {
        let user = session.current_user()?;
        let ledger = self.db.ledger();

        let transactions = if user.is_manager() {
            ledger.list_recent(limit).await?
        } else {
            ledger.list_by_cashier(&user.id, limit).await?
        };
        Ok(transactions)
    }

    /// Looks up one receipt by its number.
    pub async fn find_receipt(
        &self,
        session: &Session,
        number: &str,
    ) -> CheckoutResult<Transaction> {
        let user = session.current_user()?;
        let transaction = self.db.ledger().get_by_number(number).await?;

        if !user.is_manager() && transaction.cashier_id != user.id {
            return Err(CheckoutError::NotAuthorized {
                action: "view another cashier's receipt",
            });
        }
        Ok(transaction)
    }

    /// Voids a completed sale. Manager only.
    pub async fn cancel(&self, session: &Session, id: &str) -> CheckoutResult<Transaction> {
        self.require_manager(session, "cancel transaction")?;
        let transaction = self.db.ledger().mark_cancelled(id).await?;
        info!(number = %transaction.number, "Transaction cancelled");
        Ok(transaction)
    }

    /// Refunds a completed sale. Manager only.
    pub async fn refund(&self, session: &Session, id: &str) -> CheckoutResult<Transaction> {
        self.require_manager(session, "refund transaction")?;
        let transaction = self.db.ledger().mark_refunded(id).await?;
        info!(number = %transaction.number, "Transaction refunded");
        Ok(transaction)
    }

    fn require_manager(&self, session: &Session, action: &'static str) -> CheckoutResult<()> {
        let user = session.current_user()?;
        if !user.is_manager() {
            return Err(CheckoutError::NotAuthorized { action });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use essy_core::money::Money;
    use essy_core::types::{Category, DraftLine, PaymentMethod, TransactionDraft, UserRole};
    use essy_store::{DbConfig, NewProduct, NewUser};

    /// Store with a manager, two staff, and one sale per staff member.
    async fn fixture() -> (Database, Session, Session, String) {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        users
            .insert(NewUser {
                username: "admin".to_string(),
                full_name: "Siti Rahayu".to_string(),
                role: UserRole::Manager,
            })
            .await
            .unwrap();
        let staff_a = users
            .insert(NewUser {
                username: "kasir1".to_string(),
                full_name: "Budi Santoso".to_string(),
                role: UserRole::Staff,
            })
            .await
            .unwrap();
        let staff_b = users
            .insert(NewUser {
                username: "kasir2".to_string(),
                full_name: "Dewi Lestari".to_string(),
                role: UserRole::Staff,
            })
            .await
            .unwrap();

        let product = db
            .catalog()
            .insert(NewProduct {
                name: "Espresso".to_string(),
                description: None,
                category: Category::Coffee,
                price: Money::from_minor(15_000),
                stock: 50,
            })
            .await
            .unwrap();

        let mut first_id = String::new();
        for staff in [&staff_a, &staff_b] {
            let draft = TransactionDraft {
                cashier_id: staff.id.clone(),
                cashier_name: staff.full_name.clone(),
                lines: vec![DraftLine {
                    product_id: product.id.clone(),
                    name: "Espresso".to_string(),
                    quantity: 1,
                    unit_price: Money::from_minor(15_000),
                    subtotal: Money::from_minor(15_000),
                    note: None,
                }],
                subtotal: Money::from_minor(15_000),
                tax: Money::from_minor(1_500),
                discount: Money::zero(),
                total: Money::from_minor(16_500),
                payment_method: PaymentMethod::Cash,
                paid: Money::from_minor(16_500),
                change: Money::zero(),
                notes: None,
            };
            let txn = db.ledger().append(&draft, "TRX").await.unwrap();
            if staff.id == staff_a.id {
                first_id = txn.id;
            }
        }

        let mut manager = Session::new();
        manager.login(&users, "admin").await.unwrap();
        let mut staff = Session::new();
        staff.login(&users, "kasir1").await.unwrap();

        (db, manager, staff, first_id)
    }

    #[tokio::test]
    async fn test_manager_sees_all_staff_sees_own() {
        let (db, manager, staff, _) = fixture().await;
        let history = TransactionHistory::new(db);

        assert_eq!(history.list(&manager, 10).await.unwrap().len(), 2);

        let own = history.list(&staff, 10).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].cashier_name, "Budi Santoso");
    }

    #[tokio::test]
    async fn test_receipt_lookup_gated_by_ownership() {
        let (db, manager, staff, _) = fixture().await;
        let history = TransactionHistory::new(db);

        let all = history.list(&manager, 10).await.unwrap();
        let other = all
            .iter()
            .find(|t| t.cashier_name == "Dewi Lestari")
            .unwrap();

        assert!(history.find_receipt(&manager, &other.number).await.is_ok());
        assert!(matches!(
            history.find_receipt(&staff, &other.number).await,
            Err(CheckoutError::NotAuthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_and_refund_are_manager_only() {
        let (db, manager, staff, txn_id) = fixture().await;
        let history = TransactionHistory::new(db);

        assert!(matches!(
            history.cancel(&staff, &txn_id).await,
            Err(CheckoutError::NotAuthorized { .. })
        ));

        let cancelled = history.cancel(&manager, &txn_id).await.unwrap();
        assert_eq!(
            cancelled.status,
            essy_core::types::TransactionStatus::Cancelled
        );
    }
}
