//! Parent profile query and payment-method mutation endpoints.
//!
//! Every mutation follows the same shape: load the parent's current
//! rows into a fresh domain snapshot, run one transition (which writes
//! its audit entry), persist the differences back through the store,
//! and return the result. Nothing is kept in memory between requests.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ParentId, PaymentMethodId};
use domain::{AuditLogger, Invoice, ParentProfile, ParentProfileBackend, PaymentMethod};
use profile_store::ProfileStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: ProfileStore> {
    pub store: S,
    pub logger: Arc<dyn AuditLogger>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct AddPaymentMethodRequest {
    pub method: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct DeletePaymentMethodResponse {
    pub deleted: bool,
}

// -- Handlers --

/// GET /parents/:parentId — look up a parent profile.
#[tracing::instrument(skip(state))]
pub async fn parent_profile<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(parent_id): Path<i64>,
) -> Result<Json<ParentProfile>, ApiError> {
    let parent_id = ParentId::new(parent_id);
    let backend = load_snapshot(&state, parent_id).await?;

    backend
        .parent_profile(parent_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Parent profile {parent_id} not found")))
}

/// GET /parents/:parentId/invoices — list the parent's invoices.
#[tracing::instrument(skip(state))]
pub async fn invoices<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let parent_id = ParentId::new(parent_id);
    let backend = load_snapshot(&state, parent_id).await?;
    Ok(Json(backend.invoices(parent_id)))
}

/// GET /parents/:parentId/payment-methods — list the parent's payment methods.
#[tracing::instrument(skip(state))]
pub async fn payment_methods<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let parent_id = ParentId::new(parent_id);
    let backend = load_snapshot(&state, parent_id).await?;
    Ok(Json(backend.payment_methods(parent_id)))
}

/// POST /parents/:parentId/payment-methods — add an inactive payment method.
///
/// New methods start inactive; activation is a separate, explicit
/// transition. The row is inserted before the domain transition runs so
/// the audit entry names the storage-assigned id.
#[tracing::instrument(skip(state, req))]
pub async fn add_payment_method<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(parent_id): Path<i64>,
    Json(req): Json<AddPaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethod>), ApiError> {
    let parent_id = ParentId::new(parent_id);
    let backend = load_snapshot(&state, parent_id).await?;

    let stored = state
        .store
        .create_payment_method(&PaymentMethod::unsaved(parent_id, req.method.as_str(), false))
        .await?;
    let (_, created) = backend
        .create_payment_method_with_id(parent_id, stored.id, &req.method, false)
        .await?;

    metrics::counter!("payment_methods_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /parents/:parentId/payment-methods/:methodId/activate — make the
/// given method the parent's only active one.
#[tracing::instrument(skip(state))]
pub async fn set_active_payment_method<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((parent_id, method_id)): Path<(i64, i64)>,
) -> Result<Json<PaymentMethod>, ApiError> {
    let parent_id = ParentId::new(parent_id);
    let method_id = PaymentMethodId::new(method_id);

    let before = state.store.retrieve_payment_methods(parent_id).await?;
    let backend = ParentProfileBackend::from_rows(
        Vec::new(),
        Vec::new(),
        before.clone(),
        state.logger.clone(),
    );

    let (next, activated) = backend.set_active_payment_method(parent_id, method_id).await?;

    let changed = changed_methods(&before, &next.payment_methods(parent_id));
    state.store.update_payment_methods(&changed).await?;

    metrics::counter!("payment_methods_activated_total").increment(1);
    Ok(Json(activated))
}

/// DELETE /parents/:parentId/payment-methods/:methodId — remove a payment
/// method; reports whether anything was deleted.
#[tracing::instrument(skip(state))]
pub async fn delete_payment_method<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((parent_id, method_id)): Path<(i64, i64)>,
) -> Result<Json<DeletePaymentMethodResponse>, ApiError> {
    let parent_id = ParentId::new(parent_id);
    let method_id = PaymentMethodId::new(method_id);

    let backend = load_snapshot(&state, parent_id).await?;
    let (_, deleted) = backend.delete_payment_method(parent_id, method_id).await?;

    let deleted = match deleted {
        Some(_) => state.store.delete_payment_method(method_id).await?,
        None => false,
    };

    if deleted {
        metrics::counter!("payment_methods_deleted_total").increment(1);
    }
    Ok(Json(DeletePaymentMethodResponse { deleted }))
}

/// Loads the parent's current rows into a fresh request-scoped snapshot.
async fn load_snapshot<S: ProfileStore>(
    state: &AppState<S>,
    parent_id: ParentId,
) -> Result<ParentProfileBackend<Arc<dyn AuditLogger>>, ApiError> {
    let profiles = state.store.retrieve_parent_profiles(parent_id).await?;
    let invoices = state.store.retrieve_invoices(parent_id).await?;
    let payment_methods = state.store.retrieve_payment_methods(parent_id).await?;
    Ok(ParentProfileBackend::from_rows(
        profiles,
        invoices,
        payment_methods,
        state.logger.clone(),
    ))
}

/// Returns the methods whose stored rows differ after a transition.
fn changed_methods(before: &[PaymentMethod], after: &[PaymentMethod]) -> Vec<PaymentMethod> {
    after
        .iter()
        .filter(|pm| {
            before
                .iter()
                .find(|b| b.id == pm.id)
                .is_none_or(|b| b != *pm)
        })
        .cloned()
        .collect()
}
