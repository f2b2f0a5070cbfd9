//! The storage contract consumed by the API layer.

use async_trait::async_trait;
use common::{ParentId, PaymentMethodId};
use domain::{Invoice, ParentProfile, PaymentMethod};

use crate::Result;

/// Request/response storage collaborator for profile data.
///
/// Each call is a single round trip against the relational store. The
/// core never relies on cross-call transactional guarantees; a failed
/// call aborts the whole request.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the profile rows matching the given parent id.
    async fn retrieve_parent_profiles(&self, parent_id: ParentId) -> Result<Vec<ParentProfile>>;

    /// Loads all invoices belonging to the parent, in insertion order.
    async fn retrieve_invoices(&self, parent_id: ParentId) -> Result<Vec<Invoice>>;

    /// Loads all payment methods belonging to the parent, in insertion order.
    async fn retrieve_payment_methods(&self, parent_id: ParentId) -> Result<Vec<PaymentMethod>>;

    /// Inserts a payment method and returns it with its storage-assigned id.
    async fn create_payment_method(&self, payment_method: &PaymentMethod)
    -> Result<PaymentMethod>;

    /// Writes back updated payment methods; returns the number of rows affected.
    async fn update_payment_methods(&self, payment_methods: &[PaymentMethod]) -> Result<u64>;

    /// Deletes a payment method by id; returns whether a row was deleted.
    async fn delete_payment_method(&self, method_id: PaymentMethodId) -> Result<bool>;
}
