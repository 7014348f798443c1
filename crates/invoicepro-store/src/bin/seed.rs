//! # Sample Data Seeder
//!
//! Writes the demo clients, products and invoices into a local store.
//!
//! ## Usage
//! ```bash
//! # Seed ./invoicepro_dev.db with the default namespace
//! cargo run -p invoicepro-store --bin seed
//!
//! # Custom database and namespace
//! cargo run -p invoicepro-store --bin seed -- --db ./data/local.db --namespace demo_
//! ```
//!
//! Collections that already exist are left untouched.

use std::env;

use invoicepro_core::DEFAULT_NAMESPACE;
use invoicepro_store::{migrations, seed_sample_data, LocalStore, StoreConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,invoicepro=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./invoicepro_dev.db");
    let mut namespace = String::from(DEFAULT_NAMESPACE);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--namespace" | "-n" => {
                if i + 1 < args.len() {
                    namespace = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("InvoicePro Sample Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./invoicepro_dev.db)");
                println!("  -n, --namespace <NS>     Key namespace (default: {DEFAULT_NAMESPACE})");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("InvoicePro Sample Data Seeder");
    println!("=============================");
    println!("Database:  {}", db_path);
    println!("Namespace: {}", namespace);
    println!();

    let store = LocalStore::open(StoreConfig::new(&db_path).namespace(&namespace)).await?;
    let (total, applied) = migrations::migration_status(store.pool()).await?;
    println!("✓ Connected ({applied}/{total} migrations applied)");

    let report = seed_sample_data(&store).await?;
    if report.is_empty() {
        println!("⚠ All collections already exist, nothing written.");
        println!("  Delete the database file to regenerate.");
    } else {
        for kind in &report.seeded {
            println!("✓ Seeded {}", kind);
        }
    }

    store.close().await;
    Ok(())
}
