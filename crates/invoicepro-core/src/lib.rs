//! # invoicepro-core: Pure Domain Types for InvoicePro
//!
//! This crate holds everything about InvoicePro data that does not touch I/O:
//! the entity records, the drafts used to create them, the invoice patch type,
//! ID generation and the dashboard statistics.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       InvoicePro Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser UI (excluded)                        │   │
//! │  │    Clients ──► Products ──► Invoices ──► Payments ──► Dashboard │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               invoicepro-data (routing layer)                   │   │
//! │  │      ConnectivityManager, repositories, dashboard               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ invoicepro-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   draft   │  │   stats   │  │ validation│  │   │
//! │  │   │  Client   │  │ NewClient │  │ Dashboard │  │   form    │  │   │
//! │  │   │  Invoice  │  │ Invoice-  │  │  Stats    │  │   rules   │  │   │
//! │  │   │  Payment  │  │   Patch   │  │  series   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records (Client, Product, Invoice, Payment, Settings)
//! - [`draft`] - Save drafts (`NewClient`, ...) and `InvoicePatch`
//! - [`ids`] - `<prefix>-<epochMillis>-<base36>` identifiers
//! - [`stats`] - Dashboard aggregation and the demo revenue series
//! - [`validation`] - Caller-side form rules
//! - [`error`] - Validation error types
//!
//! ## Example Usage
//!
//! ```rust
//! use invoicepro_core::stats::compute_stats;
//! use invoicepro_core::{Invoice, InvoiceStatus};
//!
//! let invoices: Vec<Invoice> = Vec::new();
//! let stats = compute_stats(&invoices, 0);
//! assert_eq!(stats.total_invoices, 0);
//! assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod ids;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use draft::{Draft, InvoicePatch, NewClient, NewInvoice, NewPayment, NewProduct};
pub use error::{ValidationError, ValidationResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key namespace used by the original browser store.
///
/// Every persisted key is `<namespace><collection>`, e.g. `invoicepro_clients`.
pub const DEFAULT_NAMESPACE: &str = "invoicepro_";

/// Collections that exist in local mode, in display order.
pub const LOCAL_COLLECTIONS: [&str; 5] = ["clients", "products", "invoices", "payments", "settings"];

/// Number of invoices shown in the dashboard's "recent" list.
pub const RECENT_INVOICE_LIMIT: usize = 5;
