//! Entity models for the parent profile domain.

use chrono::NaiveDate;
use common::{InvoiceId, LogEntryId, ParentId, PaymentMethodId};
use serde::{Deserialize, Serialize};

/// A parent's profile with the name of their child.
///
/// Read-mostly: profiles are created but never mutated or deleted
/// by the domain layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentProfile {
    pub id: ParentId,
    pub name: String,
    pub child: String,
}

/// An invoice billed to a parent. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub parent_id: ParentId,
    pub amount: f64,
    pub date: NaiveDate,
}

/// A payment method registered for a parent.
///
/// `is_active` is the only mutable field; per parent, at most one
/// method is active at any snapshot boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub parent_id: ParentId,
    pub method: String,
    pub is_active: bool,
}

/// Category of an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    PaymentMethod,
    Invoice,
}

impl LogType {
    /// Returns the category name as stored in the `logs` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::PaymentMethod => "PaymentMethod",
            LogType::Invoice => "Invoice",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An append-only audit trail entry.
///
/// `id` is `None` until the logger's persistence assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Option<LogEntryId>,
    pub parent_id: ParentId,
    pub log_type: LogType,
    pub message: String,
}

impl PaymentMethod {
    /// A method that has not been persisted yet; the store assigns the
    /// real id on insert.
    pub fn unsaved(parent_id: ParentId, method: impl Into<String>, is_active: bool) -> Self {
        Self {
            id: PaymentMethodId::new(0),
            parent_id,
            method: method.into(),
            is_active,
        }
    }
}

impl LogEntry {
    /// Creates an unpersisted entry.
    pub fn new(parent_id: ParentId, log_type: LogType, message: impl Into<String>) -> Self {
        Self {
            id: None,
            parent_id,
            log_type,
            message: message.into(),
        }
    }
}
