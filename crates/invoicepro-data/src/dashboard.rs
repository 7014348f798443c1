//! # Dashboard Aggregator
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        load_dashboard()                                 │
//! │                                                                         │
//! │   tokio::join!( clients.get_all(),                                     │
//! │                 products.get_all(),                                    │
//! │                 invoices.get_all(),                                    │
//! │                 get_stats() )                                          │
//! │        │            │             │             │                       │
//! │        ▼            ▼             ▼             ▼                       │
//! │   totalClients  totalProducts  recent 5     stats (remote aggregate    │
//! │                                revenue      or computed locally)       │
//! │                                series                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use invoicepro_core::stats::{compute_stats, monthly_revenue, recent_invoices};
use invoicepro_core::{Client, DashboardStats, Invoice, MonthlyRevenue, RECENT_INVOICE_LIMIT};
use invoicepro_store::LocalStore;

use crate::connectivity::ConnectivityManager;
use crate::repository::{ClientRepository, InvoiceRepository, ProductRepository};

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub total_products: u32,
    pub recent_invoices: Vec<Invoice>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// Computes dashboard figures from whichever backend is active.
#[derive(Debug, Clone)]
pub struct DashboardAggregator {
    connectivity: ConnectivityManager,
    store: LocalStore,
    clients: ClientRepository,
    products: ProductRepository,
    invoices: InvoiceRepository,
}

impl DashboardAggregator {
    pub fn new(connectivity: ConnectivityManager, store: LocalStore) -> Self {
        DashboardAggregator {
            clients: ClientRepository::new(connectivity.clone(), store.clone()),
            products: ProductRepository::new(connectivity.clone(), store.clone()),
            invoices: InvoiceRepository::new(connectivity.clone(), store.clone()),
            connectivity,
            store,
        }
    }

    /// Summary statistics. Never fails.
    ///
    /// Remote mode asks `GET /api/dashboard/stats`; any error moves the
    /// session to local mode and the figures are computed from the store.
    pub async fn get_stats(&self) -> DashboardStats {
        if self.connectivity.is_connected() {
            match self
                .connectivity
                .api()
                .get::<DashboardStats>("/api/dashboard/stats")
                .await
            {
                Ok(stats) => return stats,
                Err(e) => self.connectivity.record_failure("get_stats", &e),
            }
        }

        let invoices = self.store.read_all::<Invoice>().await;
        let clients = self.store.read_all::<Client>().await;
        debug!(invoices = invoices.len(), clients = clients.len(), "Computing stats locally");
        compute_stats(&invoices, clients.len())
    }

    /// Loads the whole dashboard with the reads running concurrently.
    pub async fn load_dashboard(&self) -> DashboardSnapshot {
        let (clients, products, invoices, mut stats) = tokio::join!(
            self.clients.get_all(),
            self.products.get_all(),
            self.invoices.get_all(),
            self.get_stats(),
        );

        stats.total_clients = clients.len() as u32;
        let revenue = monthly_revenue(&invoices, Utc::now().date_naive(), &mut rand::thread_rng());

        DashboardSnapshot {
            stats,
            total_products: products.len() as u32,
            recent_invoices: recent_invoices(&invoices, RECENT_INVOICE_LIMIT),
            monthly_revenue: revenue,
        }
    }
}
