//! Shared identifier types used across the parent profile backend.

pub mod types;

pub use types::{InvoiceId, LogEntryId, ParentId, PaymentMethodId};
