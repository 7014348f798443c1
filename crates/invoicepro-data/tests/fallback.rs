//! Remote/local routing against stub API servers.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{day, dead_url, sample_client, service, spawn, Hits};
use invoicepro_core::{
    timestamp_now, DashboardStats, Draft, InvoicePatch, InvoiceStatus, NewClient, NewInvoice, NewPayment, NewProduct,
    PaymentMethod,
};
use invoicepro_data::{DataError, StorageMode};

fn handshake() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "database": "invoicepro",
            "collections": ["clients", "products", "invoices", "payments"],
            "message": "Database connection successful"
        }
    }))
}

/// Every endpoint answers 500 and counts the hit.
fn failing_router(hits: Hits) -> Router {
    Router::new().fallback(move || {
        let hits = hits.clone();
        async move {
            hits.bump();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "database offline" })),
            )
        }
    })
}

// =============================================================================
// Connectivity
// =============================================================================

#[tokio::test]
async fn test_connect_to_healthy_remote() {
    let router = Router::new()
        .route("/api/test", get(|| async { handshake() }))
        .route(
            "/api/connection",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "isConnected": true, "database": "invoicepro", "collections": ["clients"] }
                }))
            }),
        );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Local).await;

    assert!(service.connectivity().connect().await);
    assert!(service.is_connected());

    let (database, collections) = service.connectivity().remote_details();
    assert_eq!(database.as_deref(), Some("invoicepro"));
    assert_eq!(collections.len(), 4);

    let info = service.connectivity().connection_info().await;
    assert_eq!(info.mode, StorageMode::Remote);
    assert!(info.connected);
    assert_eq!(info.database, "invoicepro");
}

#[tokio::test]
async fn test_connect_to_dead_remote_falls_back() {
    let service = service(&dead_url(), StorageMode::Remote).await;
    assert!(!service.connectivity().connect().await);
    assert!(!service.is_connected());
    assert_eq!(service.connectivity().storage_mode(), StorageMode::Local);
}

#[tokio::test]
async fn test_handshake_without_collections_is_unhealthy() {
    let router = Router::new().route(
        "/api/test",
        get(|| async { Json(json!({ "success": true, "data": { "database": "x" } })) }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(!service.connectivity().connect().await);
    assert!(!service.is_connected());
}

#[tokio::test]
async fn test_reconnect_after_backend_recovers() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = healthy.clone();
    let router = Router::new().route(
        "/api/test",
        get(move || {
            let flag = flag.clone();
            async move {
                if flag.load(Ordering::SeqCst) {
                    (StatusCode::OK, handshake())
                } else {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(json!({ "success": false, "error": "starting" })),
                    )
                }
            }
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(!service.connectivity().connect().await);
    assert!(!service.is_connected());

    healthy.store(true, Ordering::SeqCst);
    assert!(service.connectivity().reconnect().await);
    assert!(service.is_connected());
}

#[tokio::test]
async fn test_connection_info_failure_keeps_mode() {
    let hits = Hits::default();
    let url = spawn(failing_router(hits.clone())).await;
    let service = service(&url, StorageMode::Remote).await;

    let info = service.connectivity().connection_info().await;
    assert_eq!(info.mode, StorageMode::Local);
    assert_eq!(info.database, "localStorage");
    assert_eq!(info.collections.len(), 5);
    assert!(service.is_connected());
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test]
async fn test_transient_failure_is_retried_then_falls_back() {
    let hits = Hits::default();
    let url = spawn(failing_router(hits.clone())).await;
    let service = service(&url, StorageMode::Remote).await;

    let local = service.store().upsert(sample_client("Local Only")).await.unwrap();

    let clients = service.clients().get_all().await;
    assert_eq!(clients, vec![local]);
    assert_eq!(hits.count(), 3);
    assert!(!service.is_connected());
}

#[tokio::test]
async fn test_fallback_applies_to_every_repository() {
    let hits = Hits::default();
    let url = spawn(failing_router(hits.clone())).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(service.invoices().get_all().await.is_empty());
    let after_failure = hits.count();

    let product = service
        .products()
        .save(NewProduct::new("Logo Design", 500.0, "piece"))
        .await
        .unwrap();
    let payment = service
        .payments()
        .save(NewPayment::new("inv-1", 120.0, PaymentMethod::BankTransfer, day(3)))
        .await
        .unwrap();

    assert_eq!(service.products().get_all().await, vec![product]);
    assert_eq!(service.payments().get_all().await, vec![payment]);
    assert_eq!(hits.count(), after_failure);
}

#[tokio::test]
async fn test_write_falls_back_when_backend_unavailable() {
    let service = service(&dead_url(), StorageMode::Remote).await;

    let saved = service
        .clients()
        .save(NewClient::new("Offline Co", "hello@offline.co"))
        .await
        .unwrap();

    assert!(!service.is_connected());
    assert_eq!(service.clients().get(&saved.id).await, Some(saved));
}

#[tokio::test]
async fn test_malformed_body_is_not_retried_but_falls_back() {
    let hits = Hits::default();
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/clients",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.bump();
                "<html>maintenance</html>"
            }
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(service.clients().get_all().await.is_empty());
    assert_eq!(hits.count(), 1);
    assert!(!service.is_connected());
}

#[tokio::test]
async fn test_get_all_falls_back_on_application_error() {
    let router = Router::new().route(
        "/api/products",
        get(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "success": false, "error": "forbidden" })),
            )
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(service.products().get_all().await.is_empty());
    assert!(!service.is_connected());
}

// =============================================================================
// Application Errors
// =============================================================================

#[tokio::test]
async fn test_rejected_save_propagates_and_stays_remote() {
    let router = Router::new().route(
        "/api/clients",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": "Email already used" })),
            )
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    let err = service
        .clients()
        .save(NewClient::new("Dup", "dup@example.com"))
        .await
        .unwrap_err();

    match err {
        DataError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email already used");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(service.is_connected());
    assert!(service.store().read_all::<invoicepro_core::Client>().await.is_empty());
}

#[tokio::test]
async fn test_success_false_envelope_is_rejected() {
    let router = Router::new().route(
        "/api/payments",
        post(|| async { Json(json!({ "success": false, "message": "Invoice is closed" })) }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    let err = service
        .payments()
        .save(NewPayment::new("inv-9", 10.0, PaymentMethod::Cash, day(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Rejected { ref message, .. } if message == "Invoice is closed"));
    assert!(service.is_connected());
}

#[tokio::test]
async fn test_remote_delete_of_missing_record_is_false() {
    let router = Router::new().route(
        "/api/clients/{id}",
        delete(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": "Client not found" })),
            )
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert!(!service.clients().delete("cl-missing").await.unwrap());
    assert!(service.is_connected());
}

#[tokio::test]
async fn test_remote_update_of_missing_invoice_is_not_found() {
    let router = Router::new().route(
        "/api/invoices/{id}",
        patch(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": "Invoice not found" })),
            )
        }),
    );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    let err = service
        .invoices()
        .update("inv-unknown", InvoicePatch::with_status(InvoiceStatus::Paid))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
    assert!(service.is_connected());
}

// =============================================================================
// Remote Payloads
// =============================================================================

#[tokio::test]
async fn test_remote_records_are_returned_as_is() {
    let client = sample_client("Remote Client");
    let invoice = NewInvoice::new("INV-100", &client, day(1), day(30))
        .with_status(InvoiceStatus::Sent)
        .with_total(250.0)
        .materialize(timestamp_now());
    let body = json!({ "success": true, "data": [invoice.clone()] });

    let router = Router::new()
        .route("/api/invoices", get(move || async move { Json(body) }))
        .route(
            "/api/products",
            get(|| async { Json(json!([])) }),
        );
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert_eq!(service.invoices().get_all().await, vec![invoice]);
    assert!(service.products().get_all().await.is_empty());
    assert!(service.is_connected());
}

#[tokio::test]
async fn test_remote_stats_are_used_when_connected() {
    let stats = DashboardStats {
        total_revenue: 1234.5,
        total_invoices: 9,
        total_clients: 4,
        ..Default::default()
    };
    let body = json!({ "success": true, "data": stats.clone() });
    let router = Router::new().route("/api/dashboard/stats", get(move || async move { Json(body) }));
    let url = spawn(router).await;
    let service = service(&url, StorageMode::Remote).await;

    assert_eq!(service.dashboard().get_stats().await, stats);
    assert!(service.is_connected());
}

#[tokio::test]
async fn test_stats_fall_back_to_local_computation() {
    let service = service(&dead_url(), StorageMode::Remote).await;
    let client = service.store().upsert(sample_client("A")).await.unwrap();
    let invoice = NewInvoice::new("INV-1", &client, day(1), day(2))
        .with_status(InvoiceStatus::Paid)
        .with_total(75.0)
        .materialize(timestamp_now());
    service.store().upsert(invoice).await.unwrap();

    let stats = service.dashboard().get_stats().await;
    assert_eq!(stats.total_revenue, 75.0);
    assert_eq!(stats.total_clients, 1);
    assert!(!service.is_connected());
}
