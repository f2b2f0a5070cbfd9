//! In-memory profile store for tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{InvoiceId, ParentId, PaymentMethodId};
use domain::{Invoice, ParentProfile, PaymentMethod};
use tokio::sync::RwLock;

use crate::{Result, store::ProfileStore};

#[derive(Default)]
struct Inner {
    parents: Vec<ParentProfile>,
    invoices: Vec<Invoice>,
    payment_methods: Vec<PaymentMethod>,
    next_parent_id: i64,
    next_invoice_id: i64,
    next_method_id: i64,
}

impl Inner {
    fn next_parent_id(&mut self) -> i64 {
        self.next_parent_id += 1;
        self.next_parent_id
    }

    fn next_invoice_id(&mut self) -> i64 {
        self.next_invoice_id += 1;
        self.next_invoice_id
    }

    fn next_method_id(&mut self) -> i64 {
        self.next_method_id += 1;
        self.next_method_id
    }
}

/// In-memory profile store implementation for testing.
///
/// Assigns ids the way the database does, from a store-owned sequence,
/// and provides the same interface as the PostgreSQL implementation
/// plus seed helpers for rows the API never creates itself.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryProfileStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parent row, returning it with its assigned id.
    pub async fn seed_parent(&self, name: &str, child: &str) -> ParentProfile {
        let mut inner = self.inner.write().await;
        let parent = ParentProfile {
            id: ParentId::new(inner.next_parent_id()),
            name: name.to_string(),
            child: child.to_string(),
        };
        inner.parents.push(parent.clone());
        parent
    }

    /// Inserts an invoice row, returning it with its assigned id.
    pub async fn seed_invoice(&self, parent_id: ParentId, amount: f64, date: NaiveDate) -> Invoice {
        let mut inner = self.inner.write().await;
        let invoice = Invoice {
            id: InvoiceId::new(inner.next_invoice_id()),
            parent_id,
            amount,
            date,
        };
        inner.invoices.push(invoice.clone());
        invoice
    }

    /// Returns the total number of payment method rows stored.
    pub async fn payment_method_count(&self) -> usize {
        self.inner.read().await.payment_methods.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn retrieve_parent_profiles(&self, parent_id: ParentId) -> Result<Vec<ParentProfile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .parents
            .iter()
            .filter(|p| p.id == parent_id)
            .cloned()
            .collect())
    }

    async fn retrieve_invoices(&self, parent_id: ParentId) -> Result<Vec<Invoice>> {
        let inner = self.inner.read().await;
        Ok(inner
            .invoices
            .iter()
            .filter(|i| i.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn retrieve_payment_methods(&self, parent_id: ParentId) -> Result<Vec<PaymentMethod>> {
        let inner = self.inner.read().await;
        Ok(inner
            .payment_methods
            .iter()
            .filter(|pm| pm.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn create_payment_method(
        &self,
        payment_method: &PaymentMethod,
    ) -> Result<PaymentMethod> {
        let mut inner = self.inner.write().await;
        let stored = PaymentMethod {
            id: PaymentMethodId::new(inner.next_method_id()),
            ..payment_method.clone()
        };
        inner.payment_methods.push(stored.clone());
        Ok(stored)
    }

    async fn update_payment_methods(&self, payment_methods: &[PaymentMethod]) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut affected = 0;
        for updated in payment_methods {
            if let Some(row) = inner
                .payment_methods
                .iter_mut()
                .find(|pm| pm.id == updated.id)
            {
                *row = updated.clone();
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_payment_method(&self, method_id: PaymentMethodId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.payment_methods.len();
        inner.payment_methods.retain(|pm| pm.id != method_id);
        Ok(inner.payment_methods.len() < before)
    }
}
