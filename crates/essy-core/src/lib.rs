//! # essy-core
//!
//! Pure business logic for EssyPOS: money arithmetic, the cart engine,
//! the checkout state machine, and input validation. No I/O, no async,
//! no database - those live in `essy-store` and `essy-checkout`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         essy-core                                       │
//! │                                                                         │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐              │
//! │  │  money   │  │  types   │  │   cart   │  │  checkout  │              │
//! │  │ ──────── │  │ ──────── │  │ ──────── │  │ ────────── │              │
//! │  │ Money    │  │ Product  │  │ Cart     │  │ Checkout   │              │
//! │  │ (i64)    │  │ TaxRate  │  │ CartItem │  │ state      │              │
//! │  │ tax calc │  │ Txn      │  │ totals   │  │ machine    │              │
//! │  └──────────┘  └──────────┘  └──────────┘  └────────────┘              │
//! │                                                                         │
//! │  ┌──────────┐  ┌────────────┐                                          │
//! │  │  error   │  │ validation │                                          │
//! │  └──────────┘  └────────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The optional `sqlx` feature adds `sqlx::Type` / `sqlx::FromRow`
//! derives to the domain types so `essy-store` can map rows directly.

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// Re-export commonly used types at the crate root
pub use cart::{Cart, CartItem, CartTotals};
pub use checkout::{Checkout, CheckoutState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{
    Category, DraftLine, PaymentMethod, Product, TaxRate, Transaction, TransactionDraft,
    TransactionItem, TransactionStatus, User, UserRole,
};

/// Per-line quantity ceiling in the cart.
///
/// A UX limit on manual entry; stock sufficiency is enforced
/// separately at commit time.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Default tax rate in basis points: 10% PPN.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;
