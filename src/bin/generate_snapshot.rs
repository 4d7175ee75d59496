//! Generates a seeded sample snapshot for local development:
//! `cargo run --bin generate_snapshot [path]` (default: snapshot.json).

use std::env;

use chrono::{DateTime, Duration, Utc};
use commerce_analytics::models::record::{Customer, Event, Transaction, TransactionStatus};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use serde::Serialize;

const MERCHANTS: [&str; 8] = [
    "Amazon", "Walmart", "Target", "Best Buy", "Costco", "Home Depot", "Starbucks", "McDonald's",
];
const CATEGORIES: [&str; 6] = [
    "retail", "food", "entertainment", "utilities", "healthcare", "transportation",
];
const PAYMENT_METHODS: [&str; 4] = ["credit_card", "debit_card", "paypal", "bank_transfer"];

#[derive(Serialize)]
struct SnapshotFile {
    as_of: DateTime<Utc>,
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
    events: Vec<Event>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = env::args().nth(1).unwrap_or_else(|| "snapshot.json".to_string());

    let as_of = Utc::now();
    let mut rng = StdRng::seed_from_u64(42);

    let customers: Vec<Customer> = (1..=200)
        .map(|i| Customer {
            customer_id: format!("CUST_{:06}", i),
            registration_date: as_of - Duration::days(rng.gen_range(1..=365)),
            is_active: rng.gen_range(0..10) < 8,
        })
        .collect();

    let transactions: Vec<Transaction> = (1..=2000)
        .map(|i| {
            let status = match rng.gen_range(0..100) {
                0..=84 => TransactionStatus::Completed,
                85..=94 => TransactionStatus::Pending,
                _ => TransactionStatus::Failed,
            };
            let currency = match rng.gen_range(0..10) {
                0..=6 => "USD",
                7..=8 => "EUR",
                _ => "GBP",
            };
            Transaction {
                transaction_id: format!("TXN_{:08}", i),
                customer_id: format!("CUST_{:06}", rng.gen_range(1..=200)),
                transaction_date: as_of - Duration::days(rng.gen_range(0..365)),
                amount: Decimal::new(rng.gen_range(1000..=100_000), 2),
                currency: currency.to_string(),
                merchant: MERCHANTS[rng.gen_range(0..MERCHANTS.len())].to_string(),
                category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
                payment_method: PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())]
                    .to_string(),
                status,
            }
        })
        .collect();

    let events: Vec<Event> = (1..=1000)
        .map(|_| Event {
            customer_id: format!("CUST_{:06}", rng.gen_range(1..=200)),
            session_id: format!("SESS_{:06}", rng.gen_range(1..=400)),
            timestamp: as_of - Duration::days(rng.gen_range(0..90)),
        })
        .collect();

    let file = SnapshotFile {
        as_of,
        customers,
        transactions,
        events,
    };
    std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;

    println!(
        "Wrote {}: {} customers, {} transactions, {} events",
        path,
        file.customers.len(),
        file.transactions.len(),
        file.events.len()
    );
    Ok(())
}
