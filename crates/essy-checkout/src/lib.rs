//! # essy-checkout
//!
//! Orchestration layer wiring the pure checkout machine (`essy-core`)
//! to the store (`essy-store`).
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        essy-checkout                                    │
//! │                                                                         │
//! │  config    PosConfig (store name, tax rate, number prefix)              │
//! │  session   Session (who is behind the register)                         │
//! │  state     CartState (shared live cart)                                 │
//! │  service   CheckoutService (atomic commit with recovery)                │
//! │  history   TransactionHistory (role-gated ledger views)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod service;
pub mod session;
pub mod state;

pub use config::PosConfig;
pub use error::{CheckoutError, CheckoutResult};
pub use history::TransactionHistory;
pub use service::CheckoutService;
pub use session::Session;
pub use state::CartState;
