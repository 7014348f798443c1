//! Invoice-only partial updates.

use invoicepro_core::{Invoice, InvoicePatch};

use super::Repository;
use crate::error::{DataError, DataResult};

impl Repository<Invoice> {
    /// Shallow-merges `patch` into the stored invoice and refreshes
    /// `updatedAt`.
    ///
    /// Unlike [`Repository::save`] this never creates a record: an unknown
    /// (or empty) id is a `NotFound` error.
    pub async fn update(&self, id: &str, patch: InvoicePatch) -> DataResult<Invoice> {
        if id.is_empty() {
            return Err(DataError::not_found("Invoice", id));
        }

        if self.connectivity.is_connected() {
            let path = Self::record_path(id);
            match self.connectivity.api().patch::<_, Invoice>(&path, &patch).await {
                Ok(invoice) => return Ok(invoice),
                Err(e) if e.is_not_found() => return Err(DataError::not_found("Invoice", id)),
                Err(e) if e.is_backend_unavailable() => self.connectivity.record_failure("update", &e),
                Err(e) => return Err(e),
            }
        }

        self.store
            .modify::<Invoice, _>(id, |invoice| patch.apply(invoice))
            .await?
            .ok_or_else(|| DataError::not_found("Invoice", id))
    }
}
