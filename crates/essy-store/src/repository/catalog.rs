//! # Catalog Repository
//!
//! CRUD and stock management for the product catalog.
//!
//! Two invariants are enforced in SQL, not application code, so they
//! hold under concurrent access:
//! - `stock` never goes negative (`MAX(0, …)` on adjustments, a
//!   compare-and-decrement guard on sales)
//! - removal is a soft delete via `is_available`, so committed
//!   transaction history keeps valid product references

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use essy_core::money::Money;
use essy_core::types::{Category, Product};
use essy_core::validation;

use crate::error::{StoreError, StoreResult};

/// Fields for creating a product; id and timestamps are generated here.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub price: Money,
    pub stock: i64,
}

/// Repository for the `products` table.
#[derive(Clone)]
pub struct CatalogRepo {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, stock, is_available, created_at, updated_at";

impl CatalogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepo { pool }
    }

    /// Products the cashier can sell right now: available with stock.
    pub async fn list_sellable(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE is_available = 1 AND stock > 0 \
             ORDER BY category, name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Every product including sold-out and soft-deleted ones.
    pub async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY category, name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Fetches one product by id.
    pub async fn get(&self, id: &str) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("product", id))
    }

    /// Validates and inserts a new product.
    pub async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        validation::validate_product_name(&new.name)?;
        validation::validate_text("description", &new.description)?;
        validation::validate_price(new.price)?;
        validation::validate_stock(new.stock)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            category: new.category,
            price: new.price,
            stock: new.stock,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO products \
             (id, name, description, category, price, stock, is_available, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Updates the editable fields of a product.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        description: Option<String>,
        category: Category,
        price: Money,
    ) -> StoreResult<Product> {
        validation::validate_product_name(name)?;
        validation::validate_text("description", &description)?;
        validation::validate_price(price)?;

        let result = sqlx::query(
            "UPDATE products SET name = ?2, description = ?3, category = ?4, \
             price = ?5, updated_at = ?6 WHERE id = ?1",
        )
        .bind(id)
        .bind(name.trim())
        .bind(&description)
        .bind(category)
        .bind(price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        self.get(id).await
    }

    /// Adjusts stock by a signed delta, clamped at zero.
    ///
    /// Used for restocks (positive) and manual corrections (negative).
    /// Sales never go through here; they use the compare-and-decrement
    /// inside the ledger's commit transaction.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<Product> {
        let result = sqlx::query(
            "UPDATE products SET stock = MAX(0, stock + ?2), updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }

        let product = self.get(id).await?;
        debug!(id = %id, delta, stock = product.stock, "Stock adjusted");
        Ok(product)
    }

    /// Hides the product from sale without deleting history.
    pub async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_available = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        debug!(id = %id, "Product soft-deleted");
        Ok(())
    }

    /// Restores a soft-deleted product.
    pub async fn restore(&self, id: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_available = 1, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    /// Total number of catalog rows, soft-deleted included.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> CatalogRepo {
        Database::connect(&DbConfig::in_memory())
            .await
            .unwrap()
            .catalog()
    }

    fn espresso() -> NewProduct {
        NewProduct {
            name: "Espresso".to_string(),
            description: Some("Single shot".to_string()),
            category: Category::Coffee,
            price: Money::from_minor(15_000),
            stock: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        let created = repo.insert(espresso()).await.unwrap();

        let loaded = repo.get(&created.id).await.unwrap();
        assert_eq!(loaded.name, "Espresso");
        assert_eq!(loaded.category, Category::Coffee);
        assert_eq!(loaded.price, Money::from_minor(15_000));
        assert_eq!(loaded.stock, 10);
        assert!(loaded.is_available);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_input() {
        let repo = repo().await;

        let mut bad = espresso();
        bad.name = "  ".to_string();
        assert!(matches!(
            repo.insert(bad).await,
            Err(StoreError::Validation(_))
        ));

        let mut bad = espresso();
        bad.price = Money::zero();
        assert!(matches!(
            repo.insert(bad).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sellable_excludes_sold_out_and_hidden() {
        let repo = repo().await;
        let a = repo.insert(espresso()).await.unwrap();

        let mut sold_out = espresso();
        sold_out.name = "Americano".to_string();
        sold_out.stock = 0;
        repo.insert(sold_out).await.unwrap();

        let mut hidden = espresso();
        hidden.name = "Mocha".to_string();
        let hidden = repo.insert(hidden).await.unwrap();
        repo.soft_delete(&hidden.id).await.unwrap();

        let sellable = repo.list_sellable().await.unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].id, a.id);

        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_adjust_stock_clamps_at_zero() {
        let repo = repo().await;
        let p = repo.insert(espresso()).await.unwrap();

        let p = repo.adjust_stock(&p.id, 5).await.unwrap();
        assert_eq!(p.stock, 15);

        // Over-correction clamps instead of going negative
        let p = repo.adjust_stock(&p.id, -100).await.unwrap();
        assert_eq!(p.stock, 0);
    }

    #[tokio::test]
    async fn test_update_edits_fields() {
        let repo = repo().await;
        let p = repo.insert(espresso()).await.unwrap();

        let updated = repo
            .update(
                &p.id,
                "Espresso Doppio",
                None,
                Category::Coffee,
                Money::from_minor(18_000),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Espresso Doppio");
        assert_eq!(updated.price, Money::from_minor(18_000));
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let repo = repo().await;
        assert!(matches!(
            repo.get("nope").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
