//! # Domain Types
//!
//! Entity records as they are stored locally and exchanged with the REST API.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │     Invoice     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id  cl-…       │◄┄┄│  clientId       │◄┄┄│  invoiceId      │       │
//! │  │  name, email    │   │  client (copy)  │   │  amount, method │       │
//! │  │  address        │   │  items[]        │   └─────────────────┘       │
//! │  │  createdAt      │   │  status, total  │                             │
//! │  └─────────────────┘   └────────┬────────┘   ┌─────────────────┐       │
//! │                                 │            │    Product      │       │
//! │                        ┌────────▼────────┐   │  ─────────────  │       │
//! │                        │  InvoiceItem    │┄┄►│  id  pr-…       │       │
//! │                        │  productId?     │   │  rate, taxRate  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┄┄► weak reference: never enforced, never cascaded                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! All records serialize as camelCase JSON. Money is a plain JSON number.
//! Business dates (`date`, `dueDate`) are `YYYY-MM-DD`; audit fields
//! (`createdAt`, `updatedAt`) are full ISO-8601 timestamps.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Entity Kind
// =============================================================================

/// The four list-shaped collections the data layer manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Product,
    Invoice,
    Payment,
}

impl EntityKind {
    /// All list-shaped kinds.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Client,
        EntityKind::Product,
        EntityKind::Invoice,
        EntityKind::Payment,
    ];

    /// Collection name used in REST paths and local store keys.
    pub const fn collection(&self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Product => "products",
            EntityKind::Invoice => "invoices",
            EntityKind::Payment => "payments",
        }
    }

    /// Prefix of generated IDs.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Client => "cl",
            EntityKind::Product => "pr",
            EntityKind::Invoice => "inv",
            EntityKind::Payment => "pay",
        }
    }

    /// Human-facing entity name for error messages.
    pub const fn entity_name(&self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Product => "Product",
            EntityKind::Invoice => "Invoice",
            EntityKind::Payment => "Payment",
        }
    }

    /// Looks a kind up by its collection name.
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == name)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

// =============================================================================
// Record Trait
// =============================================================================

/// A persisted entity that lives in one of the list-shaped collections.
///
/// ## Stamping
/// `stamp` runs on every save, after the draft has been materialized.
/// `previous` is the stored record carrying the same id, if any, so that
/// first-save audit fields survive later saves.
pub trait Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection this record belongs to.
    const KIND: EntityKind;

    /// Unique identifier.
    fn id(&self) -> &str;

    /// Applies audit stamping for a save.
    fn stamp(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {}
}

/// Current time truncated to milliseconds, the precision of the UI's clock.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Audit timestamps written by older browser builds are bare `YYYY-MM-DD`
/// dates; those read back as midnight UTC.
mod audit_timestamp {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(timestamp.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

// =============================================================================
// Client
// =============================================================================

/// Postal address embedded in a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A customer that invoices are issued to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
    /// Payment terms in days.
    #[serde(default)]
    pub payment_terms: u32,
    #[serde(default)]
    pub credit_limit: f64,
    /// Denormalized; nothing in the data layer recomputes it.
    #[serde(default)]
    pub total_outstanding: f64,
    #[ts(as = "String")]
    #[serde(deserialize_with = "audit_timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for Client {
    const KIND: EntityKind = EntityKind::Client;

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, previous: Option<&Self>, _now: DateTime<Utc>) {
        if let Some(previous) = previous {
            self.created_at = previous.created_at;
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product or service that can be put on an invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price per unit.
    pub rate: f64,
    /// Free text in practice ("hour", "piece", ...).
    pub unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_service: bool,
    /// Percent, 0-100.
    #[serde(default)]
    pub tax_rate: f64,
    /// Only meaningful when `is_service` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
///
/// Transitions are caller-driven: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// True for statuses whose total still has to be collected.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    /// Back-reference only; deleting the product does not touch the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    /// Expected to equal `quantity * rate`; never recomputed on read.
    pub amount: f64,
}

impl InvoiceItem {
    /// Creates a line with a generated id and `amount = quantity * rate`.
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        InvoiceItem {
            id: crate::ids::generate_id("item"),
            product_id: None,
            description: description.into(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }

    /// Links the line to a catalogue product.
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }
}

/// A bill issued to a client.
///
/// `client` is a snapshot taken when the invoice was written; edits to the
/// client record are not propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    /// Human-facing number; uniqueness is not checked.
    pub number: String,
    pub client_id: String,
    pub client: Client,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub subtotal: f64,
    pub tax: f64,
    /// Supplied by the caller as `subtotal + tax`; trusted as-is afterwards.
    pub total: f64,
    pub items: Vec<InvoiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[ts(as = "String")]
    #[serde(deserialize_with = "audit_timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    #[serde(deserialize_with = "audit_timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
        if let Some(previous) = previous {
            self.created_at = previous.created_at;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    BankTransfer,
    CreditCard,
    Paypal,
    Stripe,
}

/// Money received against an invoice.
///
/// Saving a payment does not change the invoice's status or any balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for Payment {
    const KIND: EntityKind = EntityKind::Payment;

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Company and presentation settings, stored as one document.
///
/// Keys the UI writes beyond the typed ones are kept in `extra` so a
/// load/save cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_company_address")]
    pub company_address: String,
    #[serde(default = "default_company_phone")]
    pub company_phone: String,
    #[serde(default = "default_company_email")]
    pub company_email: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: u32,
    #[ts(skip)]
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_company_name() -> String {
    "Your Company Name".to_string()
}

fn default_company_address() -> String {
    "123 Business Street\nCity, State 12345\nCountry".to_string()
}

fn default_company_phone() -> String {
    "+1 (555) 123-4567".to_string()
}

fn default_company_email() -> String {
    "info@yourcompany.com".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_tax_rate() -> f64 {
    8.5
}

fn default_payment_terms() -> u32 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: default_company_name(),
            company_address: default_company_address(),
            company_phone: default_company_phone(),
            company_email: default_company_email(),
            currency: default_currency(),
            tax_rate: default_tax_rate(),
            payment_terms: default_payment_terms(),
            extra: serde_json::Map::new(),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Summary statistics shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Σ total over paid invoices.
    pub total_revenue: f64,
    /// Σ total over sent and overdue invoices.
    pub outstanding_amount: f64,
    /// Σ total over overdue invoices.
    pub overdue_amount: f64,
    pub total_invoices: u32,
    pub paid_invoices: u32,
    /// Invoices with status `sent`.
    pub pending_invoices: u32,
    pub overdue_invoices: u32,
    pub total_clients: u32,
}

/// One bar of the dashboard revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyRevenue {
    /// Three-letter English month name.
    pub month: String,
    pub amount: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
