//! # Repositories
//!
//! One repository per aggregate, each a thin struct over a cloned
//! `SqlitePool`. Queries use the runtime query API with `FromRow`
//! mappings from essy-core's domain types.

pub mod catalog;
pub mod ledger;
pub mod user;

pub use catalog::{CatalogRepo, NewProduct};
pub use ledger::LedgerRepo;
pub use user::{NewUser, UserRepo};
