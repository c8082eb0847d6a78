//! # Cart Engine
//!
//! The in-memory shopping cart: an ordered collection of line items over
//! catalog snapshots, with derived totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Engine Operations                            │
//! │                                                                         │
//! │  Caller Action             Method                 Cart State Change     │
//! │  ─────────────             ──────                 ─────────────────     │
//! │                                                                         │
//! │  Tap product ────────────► add_product() ───────► qty +1 or new line   │
//! │                                                                         │
//! │  Edit quantity ──────────► set_quantity() ──────► qty = n (0 removes)  │
//! │                                                                         │
//! │  Tap +/- ────────────────► increment()/          ► qty ±1 (1-- removes)│
//! │                            decrement()                                  │
//! │                                                                         │
//! │  Tap remove ─────────────► remove_item() ───────► line dropped          │
//! │                                                                         │
//! │  New sale / committed ───► clear() ─────────────► all lines dropped     │
//! │                                                                         │
//! │  Display totals ─────────► totals() ────────────► recomputed fresh      │
//! │                                                                         │
//! │  NO I/O happens here. Stock sufficiency is NOT checked on quantity     │
//! │  edits - that is a commit-time invariant, enforced by the checkout     │
//! │  commit against the catalog store.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id (re-adding increments quantity)
//! - Line quantity is always >= 1 (decrement at 1 removes the line)
//! - Totals are derived on every call, never cached stale

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Category, Product, TaxRate};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the shopping cart.
///
/// ## Snapshot Semantics
/// The product's name, category, and unit price are frozen at add time.
/// Quantity changes recompute the line subtotal from the unit price held
/// on the line - the catalog is NOT re-fetched on display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID), the line's key within the cart.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Category at time of adding (frozen).
    pub category: Category,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in cart. Always >= 1.
    pub quantity: i64,

    /// Free-text note for the barista (e.g. "no sugar, extra shot").
    pub note: Option<String>,
}

impl CartItem {
    /// Creates a new cart line from a product snapshot with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category,
            unit_price: product.price,
            quantity: 1,
            note: None,
        }
    }

    /// Line subtotal: unit price × quantity, derived on every call.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived totals view returned by [`Cart::totals`].
///
/// Always freshly computed; a value held across cart mutations is
/// stale. Ask again instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub grand_total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress, uncommitted sale: ordered lines keyed by product id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds one unit of a product to the cart.
    ///
    /// ## Behavior
    /// - Not sellable (unavailable or zero stock): `Unsellable`
    /// - Already in cart: quantity +1, capped at [`MAX_ITEM_QUANTITY`]
    ///   (`QuantityLimitExceeded` past the cap)
    /// - Otherwise: new line with quantity 1
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if !product.is_sellable() {
            return Err(CoreError::Unsellable {
                name: product.name.clone(),
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            if item.quantity + 1 > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityLimitExceeded {
                    name: item.name.clone(),
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity += 1;
            return Ok(());
        }

        self.items.push(CartItem::from_product(product));
        Ok(())
    }

    /// Sets the quantity of an existing line.
    ///
    /// ## Behavior
    /// - No such line: `ItemNotFound`
    /// - `quantity <= 0`: removes the line (same as [`Cart::remove_item`])
    /// - Above [`MAX_ITEM_QUANTITY`]: `QuantityLimitExceeded`
    /// - Otherwise: updates quantity; the subtotal is derived so it
    ///   follows automatically
    ///
    /// Live stock is deliberately NOT checked here; see the module docs.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return Err(CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            });
        };

        if quantity <= 0 {
            self.items.retain(|i| i.product_id != product_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityLimitExceeded {
                name: item.name.clone(),
                max: MAX_ITEM_QUANTITY,
            });
        }

        item.quantity = quantity;
        Ok(())
    }

    /// Increments a line's quantity by one.
    pub fn increment(&mut self, product_id: &str) -> CoreResult<()> {
        let current = self.quantity_of(product_id).ok_or(CoreError::ItemNotFound {
            product_id: product_id.to_string(),
        })?;
        self.set_quantity(product_id, current + 1)
    }

    /// Decrements a line's quantity by one.
    ///
    /// Decrementing from quantity 1 removes the line; quantity never
    /// drops to 0 while the line exists.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<()> {
        let current = self.quantity_of(product_id).ok_or(CoreError::ItemNotFound {
            product_id: product_id.to_string(),
        })?;
        self.set_quantity(product_id, current - 1)
    }

    /// Removes a line by product id. Idempotent: absent lines are fine.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Attaches a free-text note to an existing line.
    pub fn set_note(&mut self, product_id: &str, note: Option<String>) -> CoreResult<()> {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return Err(CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            });
        };
        item.note = note;
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Read-only view of the lines, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Quantity of a given line, if present.
    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
    }

    /// Number of unique lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Computes the totals view, fresh on every call.
    ///
    /// `subtotal = Σ line subtotals`; `tax = subtotal × rate` (rounded
    /// half up at the smallest currency unit); `grand_total = subtotal +
    /// tax − discount`. No intermediate rounding.
    pub fn totals(&self, tax_rate: TaxRate, discount: Money) -> CartTotals {
        let subtotal = self
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.subtotal());
        let tax = subtotal.calculate_tax(tax_rate);
        CartTotals {
            subtotal,
            tax,
            discount,
            grand_total: subtotal + tax - discount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            category: Category::Coffee,
            price: Money::from_minor(price),
            stock,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rate() -> TaxRate {
        TaxRate::from_bps(1000) // 10%
    }

    #[test]
    fn test_add_product_creates_line_with_quantity_one() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of("1"), Some(1));
        assert_eq!(cart.items()[0].subtotal().minor(), 15_000);
    }

    #[test]
    fn test_add_same_product_twice_accumulates_quantity() {
        let mut cart = Cart::new();
        let espresso = product("1", 15_000, 10);

        cart.add_product(&espresso).unwrap();
        cart.add_product(&espresso).unwrap();

        // One line, quantity 2 - never two lines for one product
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of("1"), Some(2));
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_unsellable_product_fails() {
        let mut cart = Cart::new();

        let out_of_stock = product("1", 15_000, 0);
        assert!(matches!(
            cart.add_product(&out_of_stock),
            Err(CoreError::Unsellable { .. })
        ));

        let mut unavailable = product("2", 15_000, 10);
        unavailable.is_available = false;
        assert!(matches!(
            cart.add_product(&unavailable),
            Err(CoreError::Unsellable { .. })
        ));

        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_past_quantity_cap_fails() {
        let mut cart = Cart::new();
        let p = product("1", 15_000, 1000);

        cart.add_product(&p).unwrap();
        cart.set_quantity("1", MAX_ITEM_QUANTITY).unwrap();

        assert!(matches!(
            cart.add_product(&p),
            Err(CoreError::QuantityLimitExceeded { .. })
        ));
        assert_eq!(cart.quantity_of("1"), Some(MAX_ITEM_QUANTITY));
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes_line() {
        let mut cart = Cart::new();
        let p = product("1", 15_000, 10);

        cart.add_product(&p).unwrap();
        cart.set_quantity("1", 0).unwrap();
        assert!(cart.is_empty());

        cart.add_product(&p).unwrap();
        cart.set_quantity("1", -5).unwrap();
        assert!(cart.is_empty());

        // Subsequent set_quantity on the removed line fails
        assert!(matches!(
            cart.set_quantity("1", 3),
            Err(CoreError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();

        cart.decrement("1").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.quantity_of("1"), None);
    }

    #[test]
    fn test_remove_item_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();

        cart.remove_item("1");
        cart.remove_item("1"); // no error on absent line
        cart.remove_item("never-added");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_grand_total_identity() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();
        cart.add_product(&product("2", 18_000, 10)).unwrap();
        cart.set_quantity("1", 3).unwrap();
        cart.remove_item("2");
        cart.add_product(&product("3", 12_000, 10)).unwrap();

        let t = cart.totals(rate(), Money::zero());
        assert_eq!(t.grand_total, t.subtotal + t.tax - t.discount);
        assert_eq!(t.subtotal.minor(), 57_000);
        assert_eq!(t.tax.minor(), 5_700);
        assert_eq!(t.grand_total.minor(), 62_700);
    }

    #[test]
    fn test_totals_recomputed_after_mutation() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();

        let before = cart.totals(rate(), Money::zero());
        cart.set_quantity("1", 3).unwrap();
        let after = cart.totals(rate(), Money::zero());

        assert_eq!(before.subtotal.minor(), 15_000);
        assert_eq!(after.subtotal.minor(), 45_000);
        assert_eq!(after.grand_total.minor(), 49_500);
    }

    #[test]
    fn test_totals_with_discount() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 20_000, 10)).unwrap();

        let t = cart.totals(rate(), Money::from_minor(2_000));
        assert_eq!(t.subtotal.minor(), 20_000);
        assert_eq!(t.tax.minor(), 2_000);
        assert_eq!(t.grand_total.minor(), 20_000);
    }

    #[test]
    fn test_set_note() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();

        cart.set_note("1", Some("no sugar".to_string())).unwrap();
        assert_eq!(cart.items()[0].note.as_deref(), Some("no sugar"));

        assert!(matches!(
            cart.set_note("missing", None),
            Err(CoreError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 15_000, 10)).unwrap();
        cart.add_product(&product("2", 18_000, 10)).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(rate(), Money::zero()).grand_total, Money::zero());
    }
}
