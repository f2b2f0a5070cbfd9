//! Audit logger collaborator.
//!
//! Every payment-method lifecycle transition writes exactly one entry
//! through an injected [`AuditLogger`] before the resulting snapshot is
//! returned. The logger is a capability: production code injects a
//! database-backed implementation, tests inject [`MemoryAuditLogger`].

use std::sync::Arc;

use async_trait::async_trait;
use common::LogEntryId;
use tokio::sync::RwLock;

use crate::models::{LogEntry, PaymentMethod};

/// Boxed error type for logger implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Persists audit entries for payment-method lifecycle events.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Persists the entry and returns it with an assigned identifier.
    async fn log(&self, entry: LogEntry) -> Result<LogEntry, BoxError>;
}

#[async_trait]
impl<L: AuditLogger + ?Sized> AuditLogger for Arc<L> {
    async fn log(&self, entry: LogEntry) -> Result<LogEntry, BoxError> {
        (**self).log(entry).await
    }
}

/// Renders a payment method as `"{id}|{method}|{Active|Inactive}"`.
///
/// This exact format is part of the observable contract: audit messages
/// are asserted verbatim by tests and read by the dashboard.
pub fn format_payment_method(payment_method: &PaymentMethod) -> String {
    format!(
        "{}|{}|{}",
        payment_method.id,
        payment_method.method,
        if payment_method.is_active {
            "Active"
        } else {
            "Inactive"
        }
    )
}

/// In-memory audit logger that records entries for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MemoryAuditLogger {
    /// Creates a new empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded entries in write order.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }

    /// Returns the number of recorded entries.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AuditLogger for MemoryAuditLogger {
    async fn log(&self, entry: LogEntry) -> Result<LogEntry, BoxError> {
        let mut entries = self.entries.write().await;
        let stored = LogEntry {
            id: Some(LogEntryId::new(entries.len() as i64 + 1)),
            ..entry
        };
        entries.push(stored.clone());
        Ok(stored)
    }
}
