//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::ParentId;
use domain::{MemoryAuditLogger, PaymentMethod};
use metrics_exporter_prometheus::PrometheusHandle;
use profile_store::{InMemoryProfileStore, ProfileStore};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryProfileStore, MemoryAuditLogger) {
    let store = InMemoryProfileStore::new();
    let logger = MemoryAuditLogger::new();
    let state = api::create_state(store.clone(), Arc::new(logger.clone()));
    let app = api::create_app(state, get_metrics_handle());
    (app, store, logger)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = setup();
    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "parent-profile-api");
}

#[tokio::test]
async fn test_unknown_parent_returns_not_found() {
    let (app, _, _) = setup();
    let (status, json) = get(&app, "/parents/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Parent profile 1 not found");
}

#[tokio::test]
async fn test_get_parent_profile() {
    let (app, store, _) = setup();
    let parent = store.seed_parent("Alice", "Bob").await;

    let (status, json) = get(&app, &format!("/parents/{}", parent.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({ "id": 1, "name": "Alice", "child": "Bob" })
    );
}

#[tokio::test]
async fn test_list_invoices_with_camel_case_fields() {
    let (app, store, _) = setup();
    let parent = store.seed_parent("Alice", "Bob").await;
    store
        .seed_invoice(parent.id, 100.0, "2021-10-01".parse().unwrap())
        .await;

    let (status, json) = get(&app, "/parents/1/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!([{
            "id": 1,
            "parentId": 1,
            "amount": 100.0,
            "date": "2021-10-01",
        }])
    );
}

#[tokio::test]
async fn test_add_payment_method_starts_inactive_and_is_audited() {
    let (app, store, logger) = setup();
    store.seed_parent("Alice", "Bob").await;

    let (status, json) = send(
        &app,
        "POST",
        "/parents/1/payment-methods",
        Some(serde_json::json!({ "method": "Credit Card" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "parentId": 1,
            "method": "Credit Card",
            "isActive": false,
        })
    );

    let (_, listed) = get(&app, "/parents/1/payment-methods").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let entries = logger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].message,
        "Created payment method: 1|Credit Card|Inactive"
    );
}

#[tokio::test]
async fn test_audit_names_the_stored_id_after_a_delete() {
    let (app, store, logger) = setup();
    store.seed_parent("Alice", "Bob").await;

    // Create, delete, create again: the store sequence moves past the
    // snapshot's own count, so the audit trail must follow the store.
    let (_, first) = send(
        &app,
        "POST",
        "/parents/1/payment-methods",
        Some(serde_json::json!({ "method": "Credit Card" })),
    )
    .await;
    assert_eq!(first["id"], 1);

    send(&app, "DELETE", "/parents/1/payment-methods/1", None).await;

    let (_, second) = send(
        &app,
        "POST",
        "/parents/1/payment-methods",
        Some(serde_json::json!({ "method": "Debit Card" })),
    )
    .await;
    assert_eq!(second["id"], 2);

    let entries = logger.entries().await;
    assert_eq!(
        entries.last().unwrap().message,
        "Created payment method: 2|Debit Card|Inactive"
    );
}

#[tokio::test]
async fn test_activation_leaves_exactly_one_active_method() {
    let (app, store, logger) = setup();
    store.seed_parent("Alice", "Bob").await;
    store
        .create_payment_method(&unsaved_method(1, "Credit Card", false))
        .await
        .unwrap();
    store
        .create_payment_method(&unsaved_method(1, "Debit Card", true))
        .await
        .unwrap();

    let (status, json) = send(&app, "POST", "/parents/1/payment-methods/1/activate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "parentId": 1,
            "method": "Credit Card",
            "isActive": true,
        })
    );

    let (_, listed) = get(&app, "/parents/1/payment-methods").await;
    assert_eq!(
        listed,
        serde_json::json!([
            { "id": 1, "parentId": 1, "method": "Credit Card", "isActive": true },
            { "id": 2, "parentId": 1, "method": "Debit Card", "isActive": false },
        ])
    );

    let entries = logger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].message,
        "Activated payment method: 1|Credit Card|Active"
    );
}

#[tokio::test]
async fn test_activating_unknown_method_is_rejected() {
    let (app, store, logger) = setup();
    store.seed_parent("Alice", "Bob").await;
    store
        .create_payment_method(&unsaved_method(1, "Credit Card", true))
        .await
        .unwrap();

    let (status, _) = send(&app, "POST", "/parents/1/payment-methods/99/activate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The stored method keeps its active flag and nothing was logged.
    let (_, listed) = get(&app, "/parents/1/payment-methods").await;
    assert_eq!(listed[0]["isActive"], true);
    assert_eq!(logger.entry_count().await, 0);
}

#[tokio::test]
async fn test_delete_payment_method_reports_outcome() {
    let (app, store, logger) = setup();
    store.seed_parent("Alice", "Bob").await;
    store
        .create_payment_method(&unsaved_method(1, "Credit Card", true))
        .await
        .unwrap();

    let (status, json) = send(&app, "DELETE", "/parents/1/payment-methods/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "deleted": true }));
    assert_eq!(store.payment_method_count().await, 0);

    let entries = logger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].message,
        "Deleted payment method: 1|Credit Card|Active"
    );

    // Deleting again finds nothing and logs nothing.
    let (status, json) = send(&app, "DELETE", "/parents/1/payment-methods/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "deleted": false }));
    assert_eq!(logger.entry_count().await, 1);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (app, _, _) = setup();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn unsaved_method(parent_id: i64, name: &str, is_active: bool) -> PaymentMethod {
    PaymentMethod::unsaved(ParentId::new(parent_id), name, is_active)
}
