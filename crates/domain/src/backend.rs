//! Immutable parent profile snapshot and its transitions.

use chrono::NaiveDate;
use common::{InvoiceId, ParentId, PaymentMethodId};

use crate::error::DomainError;
use crate::logger::{AuditLogger, format_payment_method};
use crate::models::{Invoice, LogEntry, LogType, ParentProfile, PaymentMethod};

/// Immutable snapshot of parents, invoices, and payment methods.
///
/// A snapshot exclusively owns its three lists. Transitions never mutate
/// in place; each returns a new snapshot, leaving the prior one valid and
/// unchanged. Snapshots are request-scoped: built from storage-loaded
/// rows, used for one transition, then discarded; durability belongs to
/// the storage collaborator.
///
/// Payment-method lifecycle transitions write exactly one audit entry
/// through the injected logger and await it before returning.
#[derive(Debug, Clone)]
pub struct ParentProfileBackend<L> {
    parent_profiles: Vec<ParentProfile>,
    invoices: Vec<Invoice>,
    payment_methods: Vec<PaymentMethod>,
    logger: L,
}

impl<L: AuditLogger + Clone> ParentProfileBackend<L> {
    /// Creates an empty snapshot.
    pub fn new(logger: L) -> Self {
        Self::from_rows(Vec::new(), Vec::new(), Vec::new(), logger)
    }

    /// Creates a snapshot from storage-loaded rows.
    pub fn from_rows(
        parent_profiles: Vec<ParentProfile>,
        invoices: Vec<Invoice>,
        payment_methods: Vec<PaymentMethod>,
        logger: L,
    ) -> Self {
        Self {
            parent_profiles,
            invoices,
            payment_methods,
            logger,
        }
    }

    /// Looks up a parent profile by exact id.
    pub fn parent_profile(&self, parent_id: ParentId) -> Option<&ParentProfile> {
        self.parent_profiles.iter().find(|p| p.id == parent_id)
    }

    /// Returns a new snapshot with a profile appended under the next
    /// sequential id.
    ///
    /// Ids are sequential within a snapshot lineage, not globally unique
    /// across lineages that diverge from the same base; the persistent
    /// path treats storage-assigned identity as authoritative.
    pub fn create_parent_profile(
        &self,
        name: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        let profile = ParentProfile {
            id: ParentId::new(self.next_id(self.parent_profiles.iter().map(|p| p.id.as_i64()))),
            name: name.into(),
            child: child.into(),
        };

        let mut next = self.clone();
        next.parent_profiles.push(profile);
        next
    }

    /// Returns the parent's invoices in snapshot (insertion) order.
    pub fn invoices(&self, parent_id: ParentId) -> Vec<Invoice> {
        self.invoices
            .iter()
            .filter(|i| i.parent_id == parent_id)
            .cloned()
            .collect()
    }

    /// Returns a new snapshot with an invoice appended under the next
    /// sequential id.
    pub fn create_invoice(&self, parent_id: ParentId, amount: f64, date: NaiveDate) -> Self {
        let invoice = Invoice {
            id: InvoiceId::new(self.next_id(self.invoices.iter().map(|i| i.id.as_i64()))),
            parent_id,
            amount,
            date,
        };

        let mut next = self.clone();
        next.invoices.push(invoice);
        next
    }

    /// Returns the parent's payment methods in snapshot order.
    pub fn payment_methods(&self, parent_id: ParentId) -> Vec<PaymentMethod> {
        self.payment_methods
            .iter()
            .filter(|pm| pm.parent_id == parent_id)
            .cloned()
            .collect()
    }

    /// Looks up a payment method by id across all parents.
    pub fn payment_method(&self, method_id: PaymentMethodId) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|pm| pm.id == method_id)
    }

    /// Returns a new snapshot with a payment method appended under the
    /// next sequential id, and the created method itself.
    ///
    /// The `is_active` flag is taken verbatim from the caller; the
    /// single-active invariant is enforced only by
    /// [`set_active_payment_method`](Self::set_active_payment_method).
    #[tracing::instrument(skip(self))]
    pub async fn create_payment_method(
        &self,
        parent_id: ParentId,
        method: &str,
        is_active: bool,
    ) -> Result<(Self, PaymentMethod), DomainError> {
        let method_id = PaymentMethodId::new(
            self.next_id(self.payment_methods.iter().map(|pm| pm.id.as_i64())),
        );
        self.create_payment_method_with_id(parent_id, method_id, method, is_active)
            .await
    }

    /// Like [`create_payment_method`](Self::create_payment_method), but
    /// under a caller-supplied id.
    ///
    /// Used by the persistent path: the row is inserted first, and the
    /// storage-assigned id is passed through so the audit entry names
    /// the identity the method actually has in storage.
    #[tracing::instrument(skip(self))]
    pub async fn create_payment_method_with_id(
        &self,
        parent_id: ParentId,
        method_id: PaymentMethodId,
        method: &str,
        is_active: bool,
    ) -> Result<(Self, PaymentMethod), DomainError> {
        let payment_method = PaymentMethod {
            id: method_id,
            parent_id,
            method: method.to_string(),
            is_active,
        };

        self.audit(
            parent_id,
            format!(
                "Created payment method: {}",
                format_payment_method(&payment_method)
            ),
        )
        .await?;

        let mut next = self.clone();
        next.payment_methods.push(payment_method.clone());
        Ok((next, payment_method))
    }

    /// Returns a new snapshot with the matching payment method removed,
    /// and the removed method if one matched.
    ///
    /// When nothing matches, the snapshot is returned unchanged and no
    /// audit entry is written.
    #[tracing::instrument(skip(self))]
    pub async fn delete_payment_method(
        &self,
        parent_id: ParentId,
        method_id: PaymentMethodId,
    ) -> Result<(Self, Option<PaymentMethod>), DomainError> {
        let Some(position) = self
            .payment_methods
            .iter()
            .position(|pm| pm.parent_id == parent_id && pm.id == method_id)
        else {
            return Ok((self.clone(), None));
        };

        let mut next = self.clone();
        let deleted = next.payment_methods.remove(position);

        self.audit(
            parent_id,
            format!(
                "Deleted payment method: {}",
                format_payment_method(&deleted)
            ),
        )
        .await?;

        Ok((next, Some(deleted)))
    }

    /// Returns a new snapshot in which the given method is the parent's
    /// only active one, and the now-active method itself.
    ///
    /// Methods belonging to other parents are untouched. Fails with
    /// [`DomainError::PaymentMethodNotFound`] when `method_id` does not
    /// belong to `parent_id`, so a bad id can never silently deactivate
    /// the parent's methods.
    #[tracing::instrument(skip(self))]
    pub async fn set_active_payment_method(
        &self,
        parent_id: ParentId,
        method_id: PaymentMethodId,
    ) -> Result<(Self, PaymentMethod), DomainError> {
        if !self
            .payment_methods
            .iter()
            .any(|pm| pm.parent_id == parent_id && pm.id == method_id)
        {
            return Err(DomainError::PaymentMethodNotFound {
                parent_id,
                method_id,
            });
        }

        let mut next = self.clone();
        for pm in &mut next.payment_methods {
            if pm.parent_id == parent_id {
                pm.is_active = pm.id == method_id;
            }
        }

        let activated = next
            .payment_methods
            .iter()
            .find(|pm| pm.id == method_id)
            .cloned()
            .ok_or(DomainError::PaymentMethodNotFound {
                parent_id,
                method_id,
            })?;

        self.audit(
            parent_id,
            format!(
                "Activated payment method: {}",
                format_payment_method(&activated)
            ),
        )
        .await?;

        Ok((next, activated))
    }

    async fn audit(&self, parent_id: ParentId, message: String) -> Result<LogEntry, DomainError> {
        self.logger
            .log(LogEntry::new(parent_id, LogType::PaymentMethod, message))
            .await
            .map_err(DomainError::AuditLog)
    }

    /// Next sequential id: one past the highest id currently in the
    /// snapshot. Provisional only; storage-assigned ids win on persist.
    fn next_id(&self, ids: impl Iterator<Item = i64>) -> i64 {
        ids.max().unwrap_or(0) + 1
    }
}
