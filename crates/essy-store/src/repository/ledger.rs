//! # Ledger Repository
//!
//! Append-only transaction ledger with atomic stock decrement.
//!
//! ## Commit Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  append(draft) - one SQL transaction                    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each draft line:                                                 │
//! │      UPDATE products SET stock = stock - qty                            │
//! │        WHERE id = ? AND stock >= qty        ◄── compare-and-decrement   │
//! │      rows_affected == 0 → ROLLBACK, InsufficientStock                   │
//! │                                                                         │
//! │    INSERT INTO transaction_counters … ON CONFLICT                       │
//! │      DO UPDATE SET next_seq = next_seq + 1                              │
//! │      RETURNING next_seq                     ◄── per-day number          │
//! │                                                                         │
//! │    INSERT transactions header  (UNIQUE number)                          │
//! │    INSERT transaction_items × N                                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the whole sale lands (header, items, every decrement) or
//! nothing does. Under concurrent commits competing for the last units
//! of a product, SQLite's write serialization plus the `stock >= qty`
//! guard means exactly one wins; stock never goes negative.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use essy_core::money::Money;
use essy_core::types::{
    PaymentMethod, Transaction, TransactionDraft, TransactionItem, TransactionStatus,
};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Row Mapping
// =============================================================================

/// Header row without its items. Assembled into [`Transaction`] after a
/// second query loads the lines.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    number: String,
    cashier_id: String,
    cashier_name: String,
    subtotal: Money,
    tax: Money,
    discount: Money,
    total: Money,
    payment_method: PaymentMethod,
    paid: Money,
    change: Money,
    status: TransactionStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self, items: Vec<TransactionItem>) -> Transaction {
        Transaction {
            id: self.id,
            number: self.number,
            cashier_id: self.cashier_id,
            cashier_name: self.cashier_name,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            discount: self.discount,
            total: self.total,
            payment_method: self.payment_method,
            paid: self.paid,
            change: self.change,
            status: self.status,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

const HEADER_COLUMNS: &str = "id, number, cashier_id, cashier_name, subtotal, tax, discount, \
     total, payment_method, paid, change, status, notes, created_at";

const ITEM_COLUMNS: &str =
    "id, transaction_id, product_id, name, quantity, unit_price, subtotal, note";

// =============================================================================
// Ledger Repository
// =============================================================================

/// Repository for the `transactions` ledger.
#[derive(Clone)]
pub struct LedgerRepo {
    pool: SqlitePool,
}

impl LedgerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepo { pool }
    }

    /// Persists a validated draft as a completed transaction.
    ///
    /// See the module docs for the commit anatomy. Returns
    /// [`StoreError::InsufficientStock`] when any line loses the
    /// compare-and-decrement race, and [`StoreError::DuplicateNumber`]
    /// on a number collision; in both cases nothing is persisted.
    pub async fn append(&self, draft: &TransactionDraft, prefix: &str) -> StoreResult<Transaction> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Stock re-validation: decrement only if enough remains
        for line in &draft.lines {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .unwrap_or(0);
                // Dropping tx rolls back the earlier decrements
                return Err(StoreError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        // Allocate the next per-day sequence number
        let day = now.format("%Y%m%d").to_string();
        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO transaction_counters (day, next_seq) VALUES (?1, 1) \
             ON CONFLICT (day) DO UPDATE SET next_seq = next_seq + 1 \
             RETURNING next_seq",
        )
        .bind(&day)
        .fetch_one(&mut *tx)
        .await?;
        let number = format!("{}-{}-{:04}", prefix, day, seq);

        let id = Uuid::new_v4().to_string();
        let header = sqlx::query(
            "INSERT INTO transactions \
             (id, number, cashier_id, cashier_name, subtotal, tax, discount, total, \
              payment_method, paid, change, status, notes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&id)
        .bind(&number)
        .bind(&draft.cashier_id)
        .bind(&draft.cashier_name)
        .bind(draft.subtotal)
        .bind(draft.tax)
        .bind(draft.discount)
        .bind(draft.total)
        .bind(draft.payment_method)
        .bind(draft.paid)
        .bind(draft.change)
        .bind(TransactionStatus::Completed)
        .bind(&draft.notes)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(err) = header {
            if StoreError::is_unique_violation(&err) {
                // The counter allocation above rolls back with the rest of
                // the transaction, so a plain retry would format the very
                // same number again. Roll back, then repoint the counter
                // at the ledger in its own committed statement so the
                // caller's retry allocates past the collision.
                tx.rollback().await?;
                self.sync_counter_with_ledger(prefix, &day).await?;
                return Err(StoreError::DuplicateNumber { number });
            }
            return Err(err.into());
        }

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let item = TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: id.clone(),
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
                note: line.note.clone(),
            };
            sqlx::query(
                "INSERT INTO transaction_items \
                 (id, transaction_id, product_id, name, quantity, unit_price, subtotal, note) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(&item.note)
            .execute(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        info!(number = %number, total = %draft.total, "Transaction committed");

        Ok(Transaction {
            id,
            number,
            cashier_id: draft.cashier_id.clone(),
            cashier_name: draft.cashier_name.clone(),
            items,
            subtotal: draft.subtotal,
            tax: draft.tax,
            discount: draft.discount,
            total: draft.total,
            payment_method: draft.payment_method,
            paid: draft.paid,
            change: draft.change,
            status: TransactionStatus::Completed,
            notes: draft.notes.clone(),
            created_at: now,
        })
    }

    /// Loads a transaction and its items by id.
    pub async fn get(&self, id: &str) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE id = ?1",
            HEADER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("transaction", id))?;

        let items = self.load_items(&row.id).await?;
        Ok(row.into_transaction(items))
    }

    /// Loads a transaction by its receipt number.
    pub async fn get_by_number(&self, number: &str) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE number = ?1",
            HEADER_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("transaction", number))?;

        let items = self.load_items(&row.id).await?;
        Ok(row.into_transaction(items))
    }

    /// Most recent transactions across all cashiers.
    pub async fn list_recent(&self, limit: i64) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions ORDER BY created_at DESC, number DESC LIMIT ?1",
            HEADER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Most recent transactions for one cashier.
    pub async fn list_by_cashier(
        &self,
        cashier_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE cashier_id = ?1 \
             ORDER BY created_at DESC, number DESC LIMIT ?2",
            HEADER_COLUMNS
        ))
        .bind(cashier_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Voids a completed transaction.
    pub async fn mark_cancelled(&self, id: &str) -> StoreResult<Transaction> {
        self.transition_status(id, TransactionStatus::Cancelled)
            .await
    }

    /// Marks a completed transaction as refunded.
    pub async fn mark_refunded(&self, id: &str) -> StoreResult<Transaction> {
        self.transition_status(id, TransactionStatus::Refunded).await
    }

    /// Status may only leave `completed`; terminal states stay terminal.
    async fn transition_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> StoreResult<Transaction> {
        let result =
            sqlx::query("UPDATE transactions SET status = ?2 WHERE id = ?1 AND status = 'completed'")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from an illegal transition
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if exists == 0 {
                return Err(StoreError::not_found("transaction", id));
            }
            return Err(StoreError::StatusConflict { id: id.to_string() });
        }

        debug!(id = %id, ?status, "Transaction status changed");
        self.get(id).await
    }

    /// Advances the day's counter to the highest sequence already in the
    /// ledger. A number collision means the counter fell behind the
    /// `transactions` table (restored backup, imported rows); after this
    /// runs, the next allocation is strictly past every persisted number.
    async fn sync_counter_with_ledger(&self, prefix: &str, day: &str) -> StoreResult<()> {
        // Sequence digits start right after "<prefix>-YYYYMMDD-"
        sqlx::query(
            "INSERT INTO transaction_counters (day, next_seq) \
             VALUES (?2, (SELECT COALESCE(MAX(CAST(substr(number, length(?1) + 11) AS INTEGER)), 0) \
                          FROM transactions WHERE number LIKE ?1 || '-' || ?2 || '-%')) \
             ON CONFLICT (day) DO UPDATE SET next_seq = MAX(next_seq, excluded.next_seq)",
        )
        .bind(prefix)
        .bind(day)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_items(&self, transaction_id: &str) -> StoreResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {} FROM transaction_items WHERE transaction_id = ?1 ORDER BY rowid",
            ITEM_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn assemble(&self, rows: Vec<TransactionRow>) -> StoreResult<Vec<Transaction>> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            out.push(row.into_transaction(items));
        }
        Ok(out)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::catalog::NewProduct;
    use crate::repository::user::NewUser;
    use essy_core::types::{Category, DraftLine, UserRole};

    /// Database with one cashier and one product (Espresso, stock 10).
    async fn fixture() -> (Database, String, String) {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert(NewUser {
                username: "kasir".to_string(),
                full_name: "Budi Santoso".to_string(),
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
                stock: 10,
            })
            .await
            .unwrap();
        (db, user.id, product.id)
    }

    fn draft(cashier_id: &str, product_id: &str, quantity: i64) -> TransactionDraft {
        let unit_price = Money::from_minor(15_000);
        let subtotal = unit_price * quantity;
        let tax = Money::from_minor(subtotal.minor() / 10);
        let total = subtotal + tax;
        TransactionDraft {
            cashier_id: cashier_id.to_string(),
            cashier_name: "Budi Santoso".to_string(),
            lines: vec![DraftLine {
                product_id: product_id.to_string(),
                name: "Espresso".to_string(),
                quantity,
                unit_price,
                subtotal,
                note: None,
            }],
            subtotal,
            tax,
            discount: Money::zero(),
            total,
            payment_method: PaymentMethod::Cash,
            paid: total,
            change: Money::zero(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_append_persists_and_decrements_stock() {
        let (db, cashier, product) = fixture().await;
        let ledger = db.ledger();

        let txn = ledger.append(&draft(&cashier, &product, 3), "TRX").await.unwrap();
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert_eq!(txn.items.len(), 1);
        assert_eq!(txn.total, Money::from_minor(49_500));

        // Stock decremented exactly by the sold quantity
        assert_eq!(db.catalog().get(&product).await.unwrap().stock, 7);

        // Reload is field-for-field identical
        let loaded = ledger.get(&txn.id).await.unwrap();
        assert_eq!(loaded.number, txn.number);
        assert_eq!(loaded.subtotal, txn.subtotal);
        assert_eq!(loaded.tax, txn.tax);
        assert_eq!(loaded.total, txn.total);
        assert_eq!(loaded.payment_method, PaymentMethod::Cash);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].quantity, 3);
        assert_eq!(loaded.items[0].unit_price, Money::from_minor(15_000));
    }

    #[tokio::test]
    async fn test_numbers_are_sequential_within_a_day() {
        let (db, cashier, product) = fixture().await;
        let ledger = db.ledger();

        let a = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();
        let b = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();
        let c = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();

        let day = Utc::now().format("%Y%m%d").to_string();
        assert_eq!(a.number, format!("TRX-{}-0001", day));
        assert_eq!(b.number, format!("TRX-{}-0002", day));
        assert_eq!(c.number, format!("TRX-{}-0003", day));

        let found = ledger.get_by_number(&b.number).await.unwrap();
        assert_eq!(found.id, b.id);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (db, cashier, product) = fixture().await;
        let ledger = db.ledger();

        let err = ledger
            .append(&draft(&cashier, &product, 11), "TRX")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { available: 10, requested: 11, .. }
        ));

        // Nothing persisted, stock untouched
        assert_eq!(db.catalog().get(&product).await.unwrap().stock, 10);
        assert!(ledger.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_line_failure_restores_earlier_decrements() {
        let (db, cashier, product) = fixture().await;
        let scarce = db
            .catalog()
            .insert(NewProduct {
                name: "Croissant".to_string(),
                description: None,
                category: Category::Food,
                price: Money::from_minor(18_000),
                stock: 1,
            })
            .await
            .unwrap();

        let mut d = draft(&cashier, &product, 2);
        d.lines.push(DraftLine {
            product_id: scarce.id.clone(),
            name: "Croissant".to_string(),
            quantity: 2,
            unit_price: Money::from_minor(18_000),
            subtotal: Money::from_minor(36_000),
            note: None,
        });

        let err = db.ledger().append(&d, "TRX").await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { .. }));

        // The first line's decrement was rolled back too
        assert_eq!(db.catalog().get(&product).await.unwrap().stock, 10);
        assert_eq!(db.catalog().get(&scarce.id).await.unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_collision_resyncs_counter_so_retry_succeeds() {
        let (db, cashier, product) = fixture().await;
        let ledger = db.ledger();

        let first = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();

        // Counter falls behind the ledger (restored-backup scenario); the
        // next allocation formats a number that already exists
        sqlx::query("UPDATE transaction_counters SET next_seq = 0")
            .execute(db.pool())
            .await
            .unwrap();

        let err = ledger
            .append(&draft(&cashier, &product, 1), "TRX")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateNumber { .. }));
        // The colliding attempt rolled its stock decrement back
        assert_eq!(db.catalog().get(&product).await.unwrap().stock, 9);

        // The collision repointed the counter at the ledger, so a retry
        // allocates a fresh number instead of the same one forever
        let second = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();
        assert_ne!(second.number, first.number);
        let day = Utc::now().format("%Y%m%d").to_string();
        assert_eq!(second.number, format!("TRX-{}-0002", day));
        assert_eq!(db.catalog().get(&product).await.unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_status_transitions_only_from_completed() {
        let (db, cashier, product) = fixture().await;
        let ledger = db.ledger();

        let txn = ledger.append(&draft(&cashier, &product, 1), "TRX").await.unwrap();

        let cancelled = ledger.mark_cancelled(&txn.id).await.unwrap();
        assert_eq!(cancelled.status, TransactionStatus::Cancelled);

        // Terminal states reject further transitions
        assert!(matches!(
            ledger.mark_refunded(&txn.id).await,
            Err(StoreError::StatusConflict { .. })
        ));

        assert!(matches!(
            ledger.mark_cancelled("missing").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_by_cashier_filters() {
        let (db, cashier, product) = fixture().await;
        let other = db
            .users()
            .insert(NewUser {
                username: "admin".to_string(),
                full_name: "Siti Rahayu".to_string(),
                role: UserRole::Manager,
            })
            .await
            .unwrap();

        db.ledger().append(&draft(&cashier, &product, 1), "TRX").await.unwrap();
        db.ledger().append(&draft(&other.id, &product, 1), "TRX").await.unwrap();

        assert_eq!(db.ledger().list_recent(10).await.unwrap().len(), 2);
        let mine = db.ledger().list_by_cashier(&cashier, 10).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].cashier_id, cashier);
    }
}
