//! # Save Drafts and Invoice Patches
//!
//! Inputs to the repositories are distinct from the records they return.
//!
//! ```text
//! ┌──────────────┐  materialize(now)   ┌──────────────┐  stamp(prev, now)  ┌──────────────┐
//! │  NewInvoice  │ ──────────────────► │   Invoice    │ ─────────────────► │   Invoice    │
//! │  id: None    │  id = inv-…         │  createdAt   │  keep createdAt    │  persisted   │
//! │              │  createdAt = now    │  = now       │  updatedAt = now   │              │
//! └──────────────┘                     └──────────────┘                    └──────────────┘
//!
//! ┌──────────────┐  apply(&mut invoice)
//! │ InvoicePatch │ ───────────────────► shallow merge of the Some(..) fields
//! └──────────────┘
//! ```
//!
//! A draft that carries an id updates the stored record with that id; a
//! draft without one always creates a new record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::generate_id;
use crate::types::{
    Address, Client, Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentMethod, Product, Record,
};

// =============================================================================
// Draft Trait
// =============================================================================

/// Input accepted by a repository `save`.
pub trait Draft: Sized {
    /// Record produced by this draft.
    type Record: Record;

    /// Id carried by the draft, if the caller supplied one.
    fn id(&self) -> Option<&str>;

    /// Builds the record using the resolved id.
    fn build(self, id: String, now: DateTime<Utc>) -> Self::Record;

    /// Resolves the id (generating one when absent or empty) and builds
    /// the record.
    fn materialize(self, now: DateTime<Utc>) -> Self::Record {
        let id = match self.id() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id(<Self::Record as Record>::KIND.id_prefix()),
        };
        self.build(id, now)
    }
}

// =============================================================================
// NewClient
// =============================================================================

/// Draft of a [`Client`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
    pub payment_terms: u32,
    pub credit_limit: f64,
    pub total_outstanding: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewClient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        NewClient {
            name: name.into(),
            email: email.into(),
            payment_terms: 30,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

impl Draft for NewClient {
    type Record = Client;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn build(self, id: String, now: DateTime<Utc>) -> Client {
        Client {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            address: self.address,
            tax_number: self.tax_number,
            payment_terms: self.payment_terms,
            credit_limit: self.credit_limit,
            total_outstanding: self.total_outstanding,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl From<Client> for NewClient {
    fn from(client: Client) -> Self {
        NewClient {
            id: Some(client.id),
            name: client.name,
            email: client.email,
            phone: client.phone,
            company: client.company,
            address: client.address,
            tax_number: client.tax_number,
            payment_terms: client.payment_terms,
            credit_limit: client.credit_limit,
            total_outstanding: client.total_outstanding,
            created_at: Some(client.created_at),
        }
    }
}

// =============================================================================
// NewProduct
// =============================================================================

/// Draft of a [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rate: f64,
    pub unit: String,
    pub category: String,
    pub is_service: bool,
    pub tax_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, rate: f64, unit: impl Into<String>) -> Self {
        NewProduct {
            name: name.into(),
            rate,
            unit: unit.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Draft for NewProduct {
    type Record = Product;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn build(self, id: String, _now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            rate: self.rate,
            unit: self.unit,
            category: self.category,
            is_service: self.is_service,
            tax_rate: self.tax_rate,
            stock_quantity: self.stock_quantity,
        }
    }
}

impl From<Product> for NewProduct {
    fn from(product: Product) -> Self {
        NewProduct {
            id: Some(product.id),
            name: product.name,
            description: product.description,
            rate: product.rate,
            unit: product.unit,
            category: product.category,
            is_service: product.is_service,
            tax_rate: product.tax_rate,
            stock_quantity: product.stock_quantity,
        }
    }
}

// =============================================================================
// NewInvoice
// =============================================================================

/// Draft of an [`Invoice`].
///
/// `subtotal`, `tax` and `total` are stored exactly as given;
/// [`NewInvoice::with_items`] is a convenience that derives them from the
/// lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub number: String,
    pub client_id: String,
    pub client: Client,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewInvoice {
    /// Starts a draft invoice for `client`, snapshotting the client record.
    pub fn new(number: impl Into<String>, client: &Client, date: NaiveDate, due_date: NaiveDate) -> Self {
        NewInvoice {
            id: None,
            number: number.into(),
            client_id: client.id.clone(),
            client: client.clone(),
            date,
            due_date,
            status: InvoiceStatus::Draft,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            items: Vec::new(),
            notes: None,
            terms: None,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the lines and derives `subtotal`, `tax` (at `tax_rate` percent)
    /// and `total`.
    pub fn with_items(mut self, items: Vec<InvoiceItem>, tax_rate: f64) -> Self {
        let subtotal: f64 = items.iter().map(|item| item.amount).sum();
        let tax = subtotal * tax_rate / 100.0;
        self.items = items;
        self.subtotal = subtotal;
        self.tax = tax;
        self.total = subtotal + tax;
        self
    }

    /// Sets `total` directly, leaving the other amounts alone.
    pub fn with_total(mut self, total: f64) -> Self {
        self.total = total;
        self
    }
}

impl Draft for NewInvoice {
    type Record = Invoice;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn build(self, id: String, now: DateTime<Utc>) -> Invoice {
        Invoice {
            id,
            number: self.number,
            client_id: self.client_id,
            client: self.client,
            date: self.date,
            due_date: self.due_date,
            status: self.status,
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
            items: self.items,
            notes: self.notes,
            terms: self.terms,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl From<Invoice> for NewInvoice {
    fn from(invoice: Invoice) -> Self {
        NewInvoice {
            id: Some(invoice.id),
            number: invoice.number,
            client_id: invoice.client_id,
            client: invoice.client,
            date: invoice.date,
            due_date: invoice.due_date,
            status: invoice.status,
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            total: invoice.total,
            items: invoice.items,
            notes: invoice.notes,
            terms: invoice.terms,
            created_at: Some(invoice.created_at),
        }
    }
}

// =============================================================================
// NewPayment
// =============================================================================

/// Draft of a [`Payment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub invoice_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn new(invoice_id: impl Into<String>, amount: f64, method: PaymentMethod, date: NaiveDate) -> Self {
        NewPayment {
            id: None,
            invoice_id: invoice_id.into(),
            amount,
            method,
            date,
            reference: None,
            notes: None,
        }
    }
}

impl Draft for NewPayment {
    type Record = Payment;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn build(self, id: String, _now: DateTime<Utc>) -> Payment {
        Payment {
            id,
            invoice_id: self.invoice_id,
            amount: self.amount,
            method: self.method,
            date: self.date,
            reference: self.reference,
            notes: self.notes,
        }
    }
}

impl From<Payment> for NewPayment {
    fn from(payment: Payment) -> Self {
        NewPayment {
            id: Some(payment.id),
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            method: payment.method,
            date: payment.date,
            reference: payment.reference,
            notes: payment.notes,
        }
    }
}

// =============================================================================
// InvoicePatch
// =============================================================================

/// Partial update of an existing invoice.
///
/// Only the `Some` fields are written; `id` and `createdAt` can never be
/// changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[ts(as = "Option<String>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl InvoicePatch {
    /// Patch that only changes the status.
    pub fn with_status(status: InvoiceStatus) -> Self {
        InvoicePatch {
            status: Some(status),
            ..Default::default()
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == InvoicePatch::default()
    }

    /// Shallow-merges the patch into `invoice`. Does not touch `updatedAt`;
    /// that is stamped by the caller once the merge is persisted.
    pub fn apply(self, invoice: &mut Invoice) {
        if let Some(number) = self.number {
            invoice.number = number;
        }
        if let Some(client_id) = self.client_id {
            invoice.client_id = client_id;
        }
        if let Some(client) = self.client {
            invoice.client = client;
        }
        if let Some(date) = self.date {
            invoice.date = date;
        }
        if let Some(due_date) = self.due_date {
            invoice.due_date = due_date;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        if let Some(subtotal) = self.subtotal {
            invoice.subtotal = subtotal;
        }
        if let Some(tax) = self.tax {
            invoice.tax = tax;
        }
        if let Some(total) = self.total {
            invoice.total = total;
        }
        if let Some(items) = self.items {
            invoice.items = items;
        }
        if let Some(notes) = self.notes {
            invoice.notes = Some(notes);
        }
        if let Some(terms) = self.terms {
            invoice.terms = Some(terms);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn client() -> Client {
        NewClient::new("John Smith", "john@techcorp.com").materialize(Utc::now())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_materialize_generates_prefixed_ids() {
        let now = Utc::now();
        let client = NewClient::new("A", "a@b.co").materialize(now);
        assert!(client.id.starts_with("cl-"));
        assert_eq!(client.created_at, now);

        let product = NewProduct::new("Web Design", 150.0, "hour").materialize(now);
        assert!(product.id.starts_with("pr-"));

        let payment = NewPayment::new("inv-1", 10.0, PaymentMethod::Cash, date(2024, 1, 1)).materialize(now);
        assert!(payment.id.starts_with("pay-"));
    }

    #[test]
    fn test_empty_id_is_treated_as_absent() {
        let client = NewClient::new("A", "a@b.co").with_id("").materialize(Utc::now());
        assert!(client.id.starts_with("cl-"));
    }

    #[test]
    fn test_supplied_id_is_kept() {
        let product = NewProduct::new("Logo", 500.0, "piece")
            .with_id("pr-fixed")
            .materialize(Utc::now());
        assert_eq!(product.id, "pr-fixed");
    }

    #[test]
    fn test_invoice_stamp_preserves_created_at() {
        let c = client();
        let t0 = Utc::now();
        let first = NewInvoice::new("INV-001", &c, date(2024, 1, 1), date(2024, 1, 31)).materialize(t0);

        let t1 = t0 + Duration::seconds(5);
        let mut second = NewInvoice::from(first.clone()).materialize(t1);
        second.created_at = t1;
        second.stamp(Some(&first), t1);

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, t0);
        assert_eq!(second.updated_at, t1);
    }

    #[test]
    fn test_with_items_derives_totals() {
        let c = client();
        let invoice = NewInvoice::new("INV-002", &c, date(2024, 2, 1), date(2024, 3, 1)).with_items(
            vec![InvoiceItem::new("Design", 10.0, 100.0), InvoiceItem::new("Hosting", 1.0, 200.0)],
            10.0,
        );
        assert_eq!(invoice.subtotal, 1200.0);
        assert_eq!(invoice.tax, 120.0);
        assert_eq!(invoice.total, 1320.0);
    }

    #[test]
    fn test_patch_shallow_merge() {
        let c = client();
        let now = Utc::now();
        let mut invoice = NewInvoice::new("INV-003", &c, date(2024, 1, 1), date(2024, 1, 31))
            .with_total(100.0)
            .materialize(now);

        let patch = InvoicePatch {
            notes: Some("Thanks".into()),
            ..InvoicePatch::with_status(InvoiceStatus::Paid)
        };
        assert!(!patch.is_empty());
        patch.apply(&mut invoice);

        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.notes.as_deref(), Some("Thanks"));
        assert_eq!(invoice.total, 100.0);
        assert_eq!(invoice.number, "INV-003");
    }

    #[test]
    fn test_patch_wire_format_omits_unset_fields() {
        let patch = InvoicePatch::with_status(InvoiceStatus::Sent);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "sent" }));
        assert!(InvoicePatch::default().is_empty());
    }
}
