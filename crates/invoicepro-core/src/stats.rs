//! # Dashboard Statistics
//!
//! Pure aggregation over invoice lists. Shared by the local fallback path in
//! `invoicepro-data` and by the reference API server, so both report the
//! same numbers for the same data.
//!
//! ```text
//!   status      revenue   outstanding   overdue   counts
//!   ────────    ───────   ───────────   ───────   ──────────────
//!   paid          +total                          paidInvoices
//!   sent                    +total                pendingInvoices
//!   overdue                 +total       +total   overdueInvoices
//!   draft                                         (total only)
//!   cancelled                                     (total only)
//! ```

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;

use crate::types::{DashboardStats, Invoice, InvoiceStatus, MonthlyRevenue};

/// Number of bars in the revenue chart.
pub const REVENUE_MONTHS: u32 = 6;

/// Upper bound (exclusive) of the per-month presentation jitter.
pub const REVENUE_JITTER: f64 = 5000.0;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Computes the dashboard figures for `invoices`.
///
/// `total_clients` is passed in because client counts come from a different
/// collection.
pub fn compute_stats(invoices: &[Invoice], total_clients: usize) -> DashboardStats {
    let mut stats = DashboardStats {
        total_invoices: invoices.len() as u32,
        total_clients: total_clients as u32,
        ..Default::default()
    };

    for invoice in invoices {
        match invoice.status {
            InvoiceStatus::Paid => {
                stats.total_revenue += invoice.total;
                stats.paid_invoices += 1;
            }
            InvoiceStatus::Sent => {
                stats.outstanding_amount += invoice.total;
                stats.pending_invoices += 1;
            }
            InvoiceStatus::Overdue => {
                stats.outstanding_amount += invoice.total;
                stats.overdue_amount += invoice.total;
                stats.overdue_invoices += 1;
            }
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
        }
    }

    stats
}

/// The `limit` most recently created invoices, newest first.
pub fn recent_invoices(invoices: &[Invoice], limit: usize) -> Vec<Invoice> {
    let mut sorted = invoices.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Demo revenue series for the dashboard chart.
///
/// Produces [`REVENUE_MONTHS`] entries for the trailing calendar months
/// ending with the month of `today`, oldest first. Each amount is
/// `round(paid_revenue / 6 + jitter)` with jitter drawn uniformly from
/// `[0, REVENUE_JITTER)`. The numbers are presentation only.
pub fn monthly_revenue<R: Rng + ?Sized>(invoices: &[Invoice], today: NaiveDate, rng: &mut R) -> Vec<MonthlyRevenue> {
    let paid: f64 = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid)
        .map(|invoice| invoice.total)
        .sum();
    let base = paid / f64::from(REVENUE_MONTHS);
    let first_of_month = today.with_day(1).unwrap_or(today);

    (0..REVENUE_MONTHS)
        .rev()
        .map(|back| {
            let month = first_of_month
                .checked_sub_months(Months::new(back))
                .unwrap_or(first_of_month);
            let jitter = rng.gen_range(0.0..REVENUE_JITTER);
            MonthlyRevenue {
                month: MONTH_LABELS[month.month0() as usize].to_string(),
                amount: (base + jitter).round(),
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Draft, NewClient, NewInvoice};
    use chrono::{Duration, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn invoice(number: &str, status: InvoiceStatus, total: f64) -> Invoice {
        let client = NewClient::new("Sarah Johnson", "sarah@designstudio.com").materialize(Utc::now());
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        NewInvoice::new(number, &client, date, date)
            .with_status(status)
            .with_total(total)
            .materialize(Utc::now())
    }

    #[test]
    fn test_dashboard_scenario() {
        let invoices = vec![
            invoice("INV-1", InvoiceStatus::Paid, 100.0),
            invoice("INV-2", InvoiceStatus::Sent, 50.0),
            invoice("INV-3", InvoiceStatus::Overdue, 30.0),
            invoice("INV-4", InvoiceStatus::Cancelled, 999.0),
        ];
        let stats = compute_stats(&invoices, 2);

        assert_eq!(stats.total_revenue, 100.0);
        assert_eq!(stats.outstanding_amount, 80.0);
        assert_eq!(stats.overdue_amount, 30.0);
        assert_eq!(stats.total_invoices, 4);
        assert_eq!(stats.paid_invoices, 1);
        assert_eq!(stats.pending_invoices, 1);
        assert_eq!(stats.overdue_invoices, 1);
        assert_eq!(stats.total_clients, 2);
    }

    #[test]
    fn test_cancelled_counts_only_in_total() {
        let stats = compute_stats(&[invoice("INV-9", InvoiceStatus::Cancelled, 70.0)], 0);
        assert_eq!(stats.total_invoices, 1);
        assert_eq!(stats.total_revenue, 0.0);
        assert_eq!(stats.outstanding_amount, 0.0);
    }

    #[test]
    fn test_recent_invoices_newest_first() {
        let now = Utc::now();
        let invoices: Vec<Invoice> = (0..8)
            .map(|i| {
                let mut inv = invoice(&format!("INV-{i}"), InvoiceStatus::Sent, 10.0);
                inv.created_at = now - Duration::minutes(i);
                inv
            })
            .collect();

        let recent = recent_invoices(&invoices, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].number, "INV-0");
        assert_eq!(recent[4].number, "INV-4");
    }

    #[test]
    fn test_revenue_series_labels_wrap_year() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let series = monthly_revenue(&[], today, &mut rng);

        let labels: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
    }

    #[test]
    fn test_revenue_series_amount_bounds() {
        let invoices = vec![invoice("INV-1", InvoiceStatus::Paid, 6000.0)];
        let today = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for month in monthly_revenue(&invoices, today, &mut rng) {
            assert!(month.amount >= 1000.0);
            assert!(month.amount <= 6000.0);
            assert_eq!(month.amount, month.amount.round());
        }
    }
}
