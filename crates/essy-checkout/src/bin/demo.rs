//! End-to-end register walkthrough against an in-memory store.
//!
//! ```text
//! cargo run --bin demo
//! ```
//!
//! Seeds a minimal menu, logs a cashier in, rings up a sale paid with
//! Rp 50.000 cash, and prints the receipt.

use tracing::info;
use tracing_subscriber::EnvFilter;

use essy_core::checkout::Checkout;
use essy_core::money::Money;
use essy_core::types::{Category, PaymentMethod, Transaction, UserRole};
use essy_store::{Database, DbConfig, NewProduct, NewUser};

use essy_checkout::{CartState, CheckoutService, PosConfig, Session, TransactionHistory};

fn print_receipt(config: &PosConfig, txn: &Transaction) {
    println!();
    println!("========= {} =========", config.store_name);
    println!("{}  ({})", txn.number, txn.created_at.format("%Y-%m-%d %H:%M"));
    println!("Kasir: {}", txn.cashier_name);
    println!("--------------------------------");
    for item in &txn.items {
        println!("{:<18} {:>2} x {}", item.name, item.quantity, item.unit_price);
    }
    println!("--------------------------------");
    println!("Subtotal  {:>18}", txn.subtotal.to_string());
    println!("PPN       {:>18}", txn.tax.to_string());
    println!("Total     {:>18}", txn.total.to_string());
    println!("Tunai     {:>18}", txn.paid.to_string());
    println!("Kembali   {:>18}", txn.change.to_string());
    println!("================================");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = PosConfig::default();
    let db = Database::connect(&DbConfig::in_memory()).await?;

    db.users()
        .insert(NewUser {
            username: "kasir".to_string(),
            full_name: "Budi Santoso".to_string(),
            role: UserRole::Staff,
        })
        .await?;
    let espresso = db
        .catalog()
        .insert(NewProduct {
            name: "Espresso".to_string(),
            description: Some("Single shot".to_string()),
            category: Category::Coffee,
            price: Money::from_minor(15_000),
            stock: 50,
        })
        .await?;
    info!("Menu seeded");

    let mut session = Session::new();
    session.login(&db.users(), "kasir").await?;

    // Ring up 3 espressos
    let cart = CartState::new();
    cart.with_cart_mut(|c| {
        c.add_product(&espresso)?;
        c.set_quantity(&espresso.id, 3)
    })?;

    let mut checkout = Checkout::new(config.tax_rate);
    let totals = cart.with_cart(|c| checkout.begin(c))?;
    info!(subtotal = %totals.subtotal, tax = %totals.tax, total = %totals.grand_total, "Reviewing");

    checkout.proceed_to_payment()?;
    checkout.select_method(PaymentMethod::Cash)?;
    checkout.enter_amount(Money::from_minor(50_000))?;

    let service = CheckoutService::new(db.clone(), config.clone());
    let txn = service.commit(&mut checkout, &cart, &session, None).await?;
    print_receipt(&config, &txn);

    let history = TransactionHistory::new(db.clone());
    let recent = history.list(&session, 10).await?;
    info!(count = recent.len(), "Sales on record for this cashier");

    db.close().await;
    Ok(())
}
