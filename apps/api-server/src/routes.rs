//! # REST Routes
//!
//! ```text
//! GET    /api/test               handshake {database, collections, message}
//! GET    /api/connection         {isConnected, database, collections}
//! GET    /api/{collection}       every record
//! POST   /api/{collection}       upsert, returns the persisted record
//! DELETE /api/{collection}/{id}  true, or 404
//! PATCH  /api/invoices/{id}      merged invoice, or 404
//! GET    /api/dashboard/stats    DashboardStats
//! ```
//!
//! `{collection}` is one of `clients`, `products`, `invoices`, `payments`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use invoicepro_core::stats::compute_stats;
use invoicepro_core::{
    timestamp_now, Client, DashboardStats, Draft, EntityKind, Invoice, InvoicePatch, NewClient, NewInvoice,
    NewPayment, NewProduct, Payment, Product, Record,
};
use invoicepro_data::connectivity::{HandshakePayload, RemoteConnection};
use invoicepro_data::ApiResponse;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Builds the full API router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/test", get(handshake))
        .route("/api/connection", get(connection))
        .route("/api/clients", get(list::<Client>).post(save::<NewClient>))
        .route("/api/clients/{id}", delete(remove::<Client>))
        .route("/api/products", get(list::<Product>).post(save::<NewProduct>))
        .route("/api/products/{id}", delete(remove::<Product>))
        .route("/api/invoices", get(list::<Invoice>).post(save::<NewInvoice>))
        .route(
            "/api/invoices/{id}",
            patch(update_invoice).delete(remove::<Invoice>),
        )
        .route("/api/payments", get(list::<Payment>).post(save::<NewPayment>))
        .route("/api/payments/{id}", delete(remove::<Payment>))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .with_state(state)
}

fn collections() -> Vec<String> {
    EntityKind::ALL.iter().map(|kind| kind.collection().to_string()).collect()
}

// =============================================================================
// Connection
// =============================================================================

async fn handshake(State(state): State<AppState>) -> ApiResult<HandshakePayload> {
    if !state.store.health_check().await {
        return Err(ApiError::Unavailable("Database unavailable".to_string()));
    }

    Ok(Json(ApiResponse::ok(HandshakePayload {
        database: Some(state.database_name.clone()),
        collections: collections(),
        message: Some("Database connection successful".to_string()),
    })))
}

async fn connection(State(state): State<AppState>) -> ApiResult<RemoteConnection> {
    Ok(Json(ApiResponse::ok(RemoteConnection {
        is_connected: state.store.health_check().await,
        database: Some(state.database_name.clone()),
        collections: collections(),
    })))
}

// =============================================================================
// Collections
// =============================================================================

async fn list<R: Record>(State(state): State<AppState>) -> ApiResult<Vec<R>> {
    let records = state.store.load::<R>().await?;
    debug!(collection = R::KIND.collection(), count = records.len(), "Listed records");
    Ok(Json(ApiResponse::ok(records)))
}

/// Upsert. A body without an id creates a record with a generated one;
/// an existing id keeps its stored `createdAt`.
async fn save<D>(
    State(state): State<AppState>,
    payload: Result<Json<D>, JsonRejection>,
) -> ApiResult<D::Record>
where
    D: Draft + DeserializeOwned + Send + 'static,
{
    let Json(draft) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let record = state.store.upsert(draft.materialize(timestamp_now())).await?;

    info!(collection = <D::Record as Record>::KIND.collection(), id = record.id(), "Saved record");
    Ok(Json(ApiResponse::ok(record)))
}

async fn remove<R: Record>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    if !state.store.remove::<R>(&id).await? {
        return Err(ApiError::not_found(R::KIND.entity_name()));
    }

    info!(collection = R::KIND.collection(), id = %id, "Deleted record");
    Ok(Json(ApiResponse::ok(true)))
}

async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InvoicePatch>, JsonRejection>,
) -> ApiResult<Invoice> {
    let Json(patch) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let invoice = state
        .store
        .modify::<Invoice, _>(&id, |invoice| patch.apply(invoice))
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Invoice.entity_name()))?;

    info!(id = %id, status = %invoice.status, "Updated invoice");
    Ok(Json(ApiResponse::ok(invoice)))
}

// =============================================================================
// Dashboard
// =============================================================================

async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let invoices = state.store.load::<Invoice>().await?;
    let clients = state.store.load::<Client>().await?;
    Ok(Json(ApiResponse::ok(compute_stats(&invoices, clients.len()))))
}
