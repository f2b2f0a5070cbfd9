//! HTTP API server for the parent profile dashboard.
//!
//! Exposes the profile query and payment-method mutation operations
//! over REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::AuditLogger;
use metrics_exporter_prometheus::PrometheusHandle;
use profile_store::ProfileStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::profiles::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ProfileStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/parents/{parent_id}",
            get(routes::profiles::parent_profile::<S>),
        )
        .route(
            "/parents/{parent_id}/invoices",
            get(routes::profiles::invoices::<S>),
        )
        .route(
            "/parents/{parent_id}/payment-methods",
            get(routes::profiles::payment_methods::<S>)
                .post(routes::profiles::add_payment_method::<S>),
        )
        .route(
            "/parents/{parent_id}/payment-methods/{method_id}",
            delete(routes::profiles::delete_payment_method::<S>),
        )
        .route(
            "/parents/{parent_id}/payment-methods/{method_id}/activate",
            post(routes::profiles::set_active_payment_method::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the shared application state from a store and an audit logger.
pub fn create_state<S: ProfileStore>(store: S, logger: Arc<dyn AuditLogger>) -> Arc<AppState<S>> {
    Arc::new(AppState { store, logger })
}
