//! # Sample Data
//!
//! Demo records written into an empty store so a first run has something
//! to show.
//!
//! ```text
//!   key absent?            write
//!   ───────────────────    ───────────────────────────────────────────
//!   <ns>clients            John Smith, Sarah Johnson
//!   <ns>products           Web Development, Business Consulting
//!   <ns>invoices           INV-001 (sent), INV-002 (overdue)
//!   <ns>payments           []
//! ```
//!
//! Keys that already hold a value are never touched, even when that value
//! is an empty array.

use chrono::{Days, NaiveDate, Utc};
use tracing::info;

use invoicepro_core::{
    timestamp_now, Address, Client, Draft, EntityKind, Invoice, InvoiceItem, InvoiceStatus, NewClient, NewInvoice,
    NewProduct, Payment, Product,
};

use crate::error::StoreResult;
use crate::pool::LocalStore;

/// Collections written by [`seed_sample_data`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: Vec<EntityKind>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.seeded.is_empty()
    }
}

/// Writes the sample collections whose keys are absent.
///
/// Holds the store's write lock for the whole check-then-write sequence, so
/// a record saved concurrently is never overwritten by sample data.
pub async fn seed_sample_data(store: &LocalStore) -> StoreResult<SeedReport> {
    let _guard = store.lock_writes().await;
    let mut report = SeedReport::default();
    let today = Utc::now().date_naive();
    let clients = sample_clients();

    if store.get_item(EntityKind::Client.collection()).await?.is_none() {
        store.write_all(&clients).await?;
        report.seeded.push(EntityKind::Client);
    }

    if store.get_item(EntityKind::Product.collection()).await?.is_none() {
        store.write_all(&sample_products()).await?;
        report.seeded.push(EntityKind::Product);
    }

    if store.get_item(EntityKind::Invoice.collection()).await?.is_none() {
        let invoices = sample_invoices(&clients, today);
        store.write_all(&invoices).await?;
        report.seeded.push(EntityKind::Invoice);
    }

    if store.get_item(EntityKind::Payment.collection()).await?.is_none() {
        store.write_all::<Payment>(&[]).await?;
        report.seeded.push(EntityKind::Payment);
    }

    info!(seeded = ?report.seeded, "Sample data check complete");
    Ok(report)
}

fn sample_clients() -> Vec<Client> {
    let now = timestamp_now();
    let john = NewClient {
        phone: Some("+1 (555) 123-4567".into()),
        address: Address {
            street: "123 Business Ave".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            zip_code: "94107".into(),
            country: "USA".into(),
        },
        tax_number: Some("TAX-123456".into()),
        credit_limit: 50000.0,
        total_outstanding: 15750.0,
        ..NewClient::new("John Smith", "john@techcorp.com").with_company("TechCorp Solutions")
    };
    let sarah = NewClient {
        phone: Some("+1 (555) 234-5678".into()),
        address: Address {
            street: "456 Creative St".into(),
            city: "New York".into(),
            state: "NY".into(),
            zip_code: "10001".into(),
            country: "USA".into(),
        },
        payment_terms: 15,
        credit_limit: 25000.0,
        total_outstanding: 8400.0,
        ..NewClient::new("Sarah Johnson", "sarah@designstudio.com").with_company("Creative Design Studio")
    };
    vec![john.materialize(now), sarah.materialize(now)]
}

fn sample_products() -> Vec<Product> {
    let now = timestamp_now();
    let service = |name: &str, description: &str, rate: f64, category: &str| NewProduct {
        description: Some(description.into()),
        category: category.into(),
        is_service: true,
        tax_rate: 8.5,
        ..NewProduct::new(name, rate, "hour")
    };
    vec![
        service(
            "Web Development",
            "Custom website development and design services",
            150.0,
            "Development",
        )
        .materialize(now),
        service(
            "Business Consulting",
            "Strategic business and technical consulting",
            200.0,
            "Consulting",
        )
        .materialize(now),
    ]
}

fn sample_invoices(clients: &[Client], today: NaiveDate) -> Vec<Invoice> {
    let now = timestamp_now();
    let plus = |days: u64| today.checked_add_days(Days::new(days)).unwrap_or(today);
    let minus = |days: u64| today.checked_sub_days(Days::new(days)).unwrap_or(today);

    let mut invoices = Vec::new();
    if let Some(john) = clients.first() {
        let mut draft = NewInvoice::new("INV-001", john, today, plus(30))
            .with_status(InvoiceStatus::Sent)
            .with_items(
                vec![InvoiceItem::new("E-commerce website development", 100.0, 150.0)],
                8.5,
            );
        draft.notes = Some("Payment due within 30 days".into());
        draft.terms = Some("Net 30 days payment terms apply".into());
        invoices.push(draft.materialize(now));
    }
    if let Some(sarah) = clients.get(1) {
        let mut draft = NewInvoice::new("INV-002", sarah, minus(15), today)
            .with_status(InvoiceStatus::Overdue)
            .with_items(vec![InvoiceItem::new("Business strategy consulting", 40.0, 200.0)], 8.5);
        draft.notes = Some("Thank you for your business".into());
        draft.terms = Some("Net 30 days payment terms apply".into());
        draft.created_at = Some(now - chrono::Duration::days(15));
        invoices.push(draft.materialize(now));
    }
    invoices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::StoreConfig;

    #[tokio::test]
    async fn test_seed_fills_empty_store() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let report = seed_sample_data(&store).await.unwrap();
        assert_eq!(report.seeded.len(), 4);

        let clients: Vec<Client> = store.read_all().await;
        let invoices: Vec<Invoice> = store.read_all().await;
        assert_eq!(clients.len(), 2);
        assert_eq!(store.read_all::<Product>().await.len(), 2);
        assert!(store.read_all::<Payment>().await.is_empty());

        assert_eq!(invoices[0].total, 16275.0);
        assert_eq!(invoices[0].client_id, clients[0].id);
        assert_eq!(invoices[1].status, InvoiceStatus::Overdue);
    }

    #[tokio::test]
    async fn test_seed_leaves_existing_keys_alone() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        store.write_all::<Client>(&[]).await.unwrap();

        let report = seed_sample_data(&store).await.unwrap();
        assert!(!report.seeded.contains(&EntityKind::Client));
        assert!(store.read_all::<Client>().await.is_empty());

        let again = seed_sample_data(&store).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_seed_racing_a_save_keeps_the_saved_record() {
        for _ in 0..20 {
            let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
            let client = NewClient::new("Walk-in", "walkin@example.com").materialize(Utc::now());

            let (report, saved) = tokio::join!(seed_sample_data(&store), store.upsert(client.clone()));
            let report = report.unwrap();
            let saved = saved.unwrap();

            let clients: Vec<Client> = store.read_all().await;
            assert!(clients.contains(&saved));
            if report.seeded.contains(&EntityKind::Client) {
                assert_eq!(clients.len(), 3);
            } else {
                assert_eq!(clients, vec![saved]);
            }
        }
    }
}
