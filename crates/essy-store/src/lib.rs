//! # essy-store
//!
//! SQLite persistence for EssyPOS, built on `sqlx` with the Tokio
//! runtime.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         essy-store                                      │
//! │                                                                         │
//! │  pool        DbConfig + Database (pool lifecycle, repo accessors)       │
//! │  migrations  embedded schema migrations                                 │
//! │  repository  CatalogRepo  - products, stock                             │
//! │              LedgerRepo   - atomic transaction commit, history          │
//! │              UserRepo     - cashier accounts                            │
//! │  error       StoreError                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The commit path in [`repository::LedgerRepo::append`] is the one
//! place stock is decremented for sales; it runs as a single SQL
//! transaction so a sale is all-or-nothing.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::{CatalogRepo, LedgerRepo, NewProduct, NewUser, UserRepo};
