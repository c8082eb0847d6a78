//! # Domain Types
//!
//! Core domain types used throughout EssyPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category       │   │  number (TRX-…) │   │  name snapshot  │       │
//! │  │  price (Money)  │   │  status         │   │  unit_price     │       │
//! │  │  stock          │   │  total (Money)  │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    TaxRate      │   │TransactionStatus │   │ PaymentMethod   │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  bps (u32)      │   │  Completed       │   │  Cash           │      │
//! │  │  1000 = 10%     │   │  Cancelled       │   │  Card           │      │
//! │  └─────────────────┘   │  Refunded        │   │  DigitalWallet  │      │
//! │                        └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Transactions carry two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `number`: human-readable `TRX-YYYYMMDD-NNNN`, unique, shown on receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000. 1000 bps = 10% (Indonesian PPN).
///
/// A single `TaxRate` flows through every calculation so the rate has
/// exactly one source of truth; nothing else in the codebase holds a
/// percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    /// The uniform default rate: 10% PPN.
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Category
// =============================================================================

/// Menu category for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Coffee,
    Food,
    Beverage,
    Other,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Menu category.
    pub category: Category,

    /// Unit price in the smallest currency unit. Always positive.
    pub price: Money,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Availability flag (soft delete).
    pub is_available: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether the product can be sold right now.
    ///
    /// Invariant: sellable ⇔ available AND stock > 0.
    #[inline]
    pub fn is_sellable(&self) -> bool {
        self.is_available && self.stock > 0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a transaction was paid.
///
/// Only cash produces a nonzero change amount; for card and digital
/// wallet the tendered amount is forced equal to the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    DigitalWallet,
}

impl PaymentMethod {
    /// Whether this method supports overtendering (change due).
    #[inline]
    pub const fn allows_change(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a committed transaction.
///
/// ## Allowed Transitions
/// ```text
/// Completed ──► Cancelled
/// Completed ──► Refunded
/// (never back)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Paid and persisted.
    Completed,
    /// Voided after completion.
    Cancelled,
    /// Money returned to the customer.
    Refunded,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale with its frozen line items.
///
/// Once status is Completed the lines and totals are immutable; only the
/// status may transition (see [`TransactionStatus`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    /// Human-readable sequential number: `TRX-YYYYMMDD-NNNN`.
    pub number: String,

    /// The cashier who served the sale.
    pub cashier_id: String,

    /// Cashier display name at time of sale (frozen).
    pub cashier_name: String,

    /// Frozen line items.
    pub items: Vec<TransactionItem>,

    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,

    pub payment_method: PaymentMethod,

    /// Amount tendered by the customer.
    pub paid: Money,

    /// Change due (`paid - total`, never negative).
    pub change: Money,

    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Total quantity across all line items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A frozen line item in a committed transaction.
///
/// Uses the snapshot pattern: name and unit price are copied from the
/// product at commit time so history survives later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// Line subtotal (`unit_price × quantity`).
    pub subtotal: Money,
    /// Free-text note from the cart line (e.g. "no sugar").
    pub note: Option<String>,
}

// =============================================================================
// Transaction Draft
// =============================================================================

/// Everything the ledger needs to persist a sale, minus the fields it
/// generates itself (id, number, timestamp).
///
/// Built by the checkout state machine once payment is validated; the
/// ledger turns it into a [`Transaction`] atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub cashier_id: String,
    pub cashier_name: String,
    pub lines: Vec<DraftLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub paid: Money,
    pub change: Money,
    pub notes: Option<String>,
}

/// A single line of a [`TransactionDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub note: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// Role of a cashier account.
///
/// Managers may list the whole ledger; staff see only their own sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Staff,
    Manager,
}

/// A cashier account backing the session provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the manager capability.
    #[inline]
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
