//! # Typed Collections
//!
//! Record-level operations over the JSON array stored for each entity kind.
//!
//! ## Read vs Write Strictness
//! ```text
//! ┌──────────────────────┬──────────────────────────┬─────────────────────┐
//! │ stored value         │ read_all (list views)    │ load / upsert / ... │
//! ├──────────────────────┼──────────────────────────┼─────────────────────┤
//! │ absent               │ []                       │ treated as []       │
//! │ valid JSON array     │ records                  │ records             │
//! │ corrupt              │ [] + warn!               │ StoreError::Corrupt │
//! │ database error       │ [] + warn!               │ StoreError          │
//! └──────────────────────┴──────────────────────────┴─────────────────────┘
//! ```
//!
//! A write never replaces a value it could not parse.

use tracing::{debug, warn};

use invoicepro_core::{timestamp_now, Record};

use crate::error::{StoreError, StoreResult};
use crate::pool::LocalStore;

impl LocalStore {
    /// All records of kind `R`. Never fails; problems are logged and read
    /// as an empty collection.
    pub async fn read_all<R: Record>(&self) -> Vec<R> {
        match self.load::<R>().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    collection = R::KIND.collection(),
                    error = %e,
                    "Unreadable local collection, serving empty list"
                );
                Vec::new()
            }
        }
    }

    /// All records of kind `R`, failing on corrupt data.
    pub async fn load<R: Record>(&self) -> StoreResult<Vec<R>> {
        let name = R::KIND.collection();
        match self.get_item(name).await? {
            None => Ok(Vec::new()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| StoreError::corrupt(self.storage_key(name), e))
            }
        }
    }

    /// Replaces the whole collection.
    pub async fn write_all<R: Record>(&self, records: &[R]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.set_item(R::KIND.collection(), &raw).await
    }

    /// Inserts or replaces `record` by id and returns what was stored.
    ///
    /// The record is stamped against the stored version with the same id,
    /// so `createdAt` survives re-saves and invoices get a fresh `updatedAt`.
    pub async fn upsert<R: Record>(&self, mut record: R) -> StoreResult<R> {
        let _guard = self.lock_writes().await;
        let mut records = self.load::<R>().await?;
        let position = records.iter().position(|r| r.id() == record.id());

        record.stamp(position.map(|i| &records[i]), timestamp_now());
        match position {
            Some(i) => records[i] = record.clone(),
            None => records.push(record.clone()),
        }

        self.write_all(&records).await?;
        debug!(
            collection = R::KIND.collection(),
            id = %record.id(),
            replaced = position.is_some(),
            "Record saved locally"
        );
        Ok(record)
    }

    /// Applies `change` to the record with `id`, stamps and persists it.
    /// Returns `None` when no such record exists.
    pub async fn modify<R, F>(&self, id: &str, change: F) -> StoreResult<Option<R>>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        let _guard = self.lock_writes().await;
        let mut records = self.load::<R>().await?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };

        let previous = slot.clone();
        change(slot);
        slot.stamp(Some(&previous), timestamp_now());
        let updated = slot.clone();

        self.write_all(&records).await?;
        Ok(Some(updated))
    }

    /// Removes the record with `id`. Returns false (and writes nothing)
    /// when it does not exist.
    pub async fn remove<R: Record>(&self, id: &str) -> StoreResult<bool> {
        let _guard = self.lock_writes().await;
        let mut records = self.load::<R>().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records).await?;
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{LocalStore, StoreConfig};
    use chrono::{NaiveDate, Utc};
    use invoicepro_core::{
        Client, Draft, Invoice, InvoiceItem, InvoicePatch, InvoiceStatus, NewClient, NewInvoice, NewPayment, Payment,
        PaymentMethod,
    };

    async fn store() -> LocalStore {
        LocalStore::open(StoreConfig::in_memory()).await.unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = store().await;
        let client = NewClient::new("John Smith", "john@techcorp.com").materialize(Utc::now());

        let first = store.upsert(client.clone()).await.unwrap();
        let second = store.upsert(client.clone()).await.unwrap();

        let all: Vec<Client> = store.read_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(first, second);
        assert_eq!(all[0], second);
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let store = store().await;
        let original = store
            .upsert(NewClient::new("A", "a@b.co").materialize(Utc::now()))
            .await
            .unwrap();

        let mut edited = original.clone();
        edited.name = "A. Renamed".into();
        edited.created_at = Utc::now() + chrono::Duration::days(3);
        let saved = store.upsert(edited).await.unwrap();

        assert_eq!(saved.name, "A. Renamed");
        assert_eq!(saved.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_invoice_updated_at_moves_forward() {
        let store = store().await;
        let client = NewClient::new("A", "a@b.co").materialize(Utc::now());
        let first = store
            .upsert(NewInvoice::new("INV-1", &client, day(), day()).materialize(Utc::now()))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.upsert(first.clone()).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_computed_amounts_read_back_exactly() {
        let store = store().await;
        let client = NewClient::new("A", "a@b.co").materialize(Utc::now());
        let items = vec![
            InvoiceItem::new("Fees", 0.1 + 0.2, 19.99),
            InvoiceItem::new("Hours", 7.3, 133.37),
            InvoiceItem::new("Parts", 0.0017, 1.125),
        ];
        let invoice = store
            .upsert(
                NewInvoice::new("INV-7", &client, day(), day())
                    .with_items(items, 7.25)
                    .materialize(Utc::now()),
            )
            .await
            .unwrap();

        let stored = store.read_all::<Invoice>().await;
        assert_eq!(stored.len(), 1);
        let read = &stored[0];
        assert_eq!(read.subtotal.to_bits(), invoice.subtotal.to_bits());
        assert_eq!(read.tax.to_bits(), invoice.tax.to_bits());
        assert_eq!(read.total.to_bits(), invoice.total.to_bits());
        for (read, saved) in read.items.iter().zip(&invoice.items) {
            assert_eq!(read.quantity.to_bits(), saved.quantity.to_bits());
            assert_eq!(read.rate.to_bits(), saved.rate.to_bits());
            assert_eq!(read.amount.to_bits(), saved.amount.to_bits());
        }
        assert_eq!(read, &invoice);
    }

    #[tokio::test]
    async fn test_remove_unknown_leaves_collection() {
        let store = store().await;
        let payment = NewPayment::new("inv-1", 50.0, PaymentMethod::Cash, day()).materialize(Utc::now());
        store.upsert(payment.clone()).await.unwrap();

        assert!(!store.remove::<Payment>("pay-missing").await.unwrap());
        assert_eq!(store.read_all::<Payment>().await, vec![payment.clone()]);

        assert!(store.remove::<Payment>(&payment.id).await.unwrap());
        assert!(store.read_all::<Payment>().await.is_empty());
    }

    #[tokio::test]
    async fn test_modify_applies_patch() {
        let store = store().await;
        let client = NewClient::new("A", "a@b.co").materialize(Utc::now());
        let invoice = store
            .upsert(NewInvoice::new("INV-7", &client, day(), day()).materialize(Utc::now()))
            .await
            .unwrap();

        let updated: Invoice = store
            .modify(&invoice.id, |inv: &mut Invoice| {
                InvoicePatch::with_status(InvoiceStatus::Paid).apply(inv)
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, InvoiceStatus::Paid);
        assert_eq!(updated.created_at, invoice.created_at);

        let missing = store.modify::<Invoice, _>("inv-nope", |_| {}).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_collection_reads_empty_but_blocks_writes() {
        let store = store().await;
        store.set_item("clients", "{not json").await.unwrap();

        assert!(store.read_all::<Client>().await.is_empty());

        let client = NewClient::new("A", "a@b.co").materialize(Utc::now());
        let err = store.upsert(client).await.unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(store.get_item("clients").await.unwrap().as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_concurrent_saves_are_not_lost() {
        let store = store().await;
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let client = NewClient::new(format!("Client {i}"), "c@d.ef").materialize(Utc::now());
                store.upsert(client).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.read_all::<Client>().await.len(), 10);
    }
}
