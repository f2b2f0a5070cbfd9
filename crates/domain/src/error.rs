//! Domain error types.

use common::{ParentId, PaymentMethodId};
use thiserror::Error;

use crate::logger::BoxError;

/// Errors that can occur during domain transitions.
///
/// Lookups signal absence with `Option`, not with an error; only the
/// activation transition and audit writes can fail.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The payment method does not belong to the given parent.
    #[error("payment method {method_id} not found for parent {parent_id}")]
    PaymentMethodNotFound {
        parent_id: ParentId,
        method_id: PaymentMethodId,
    },

    /// The audit logger failed to persist an entry.
    #[error("audit log write failed: {0}")]
    AuditLog(BoxError),
}
