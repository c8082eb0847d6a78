//! Seeds a fresh database with the starter menu and two accounts.
//!
//! ```text
//! cargo run --bin seed -- [path/to/essypos.db]
//! ```
//!
//! Idempotent: refuses to re-seed a database that already has products.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use essy_core::money::Money;
use essy_core::types::{Category, UserRole};
use essy_store::{Database, DbConfig, NewProduct, NewUser, StoreResult};

/// Starter coffee-shop menu.
fn starter_menu() -> Vec<NewProduct> {
    let p = |name: &str, category: Category, price: i64, stock: i64| NewProduct {
        name: name.to_string(),
        description: None,
        category,
        price: Money::from_minor(price),
        stock,
    };

    vec![
        p("Espresso", Category::Coffee, 15_000, 50),
        p("Americano", Category::Coffee, 18_000, 50),
        p("Cappuccino", Category::Coffee, 22_000, 50),
        p("Latte", Category::Coffee, 25_000, 50),
        p("Mocha", Category::Coffee, 28_000, 50),
        p("Croissant", Category::Food, 18_000, 30),
        p("Sandwich Club", Category::Food, 35_000, 20),
        p("Donat Glazed", Category::Food, 12_000, 40),
    ]
}

#[tokio::main]
async fn main() -> StoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "essypos.db".to_string());
    let db = Database::connect(&DbConfig::new(&path)).await?;

    if db.catalog().count().await? > 0 {
        warn!(path = %path, "Database already seeded, nothing to do");
        db.close().await;
        return Ok(());
    }

    let users = db.users();
    users
        .insert(NewUser {
            username: "admin".to_string(),
            full_name: "Siti Rahayu".to_string(),
            role: UserRole::Manager,
        })
        .await?;
    users
        .insert(NewUser {
            username: "kasir".to_string(),
            full_name: "Budi Santoso".to_string(),
            role: UserRole::Staff,
        })
        .await?;
    info!("Seeded 2 user accounts (admin, kasir)");

    let catalog = db.catalog();
    let menu = starter_menu();
    let count = menu.len();
    for product in menu {
        catalog.insert(product).await?;
    }
    info!(count, path = %path, "Seeded starter menu");

    db.close().await;
    Ok(())
}
