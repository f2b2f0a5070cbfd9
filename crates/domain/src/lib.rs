//! Domain layer for the parent profile backend.
//!
//! This crate provides the core domain abstractions including:
//! - Entity models for parents, invoices, payment methods, and log entries
//! - The immutable `ParentProfileBackend` snapshot with transition methods
//! - The `AuditLogger` collaborator trait for payment-method audit trails

pub mod backend;
pub mod error;
pub mod logger;
pub mod models;

pub use backend::ParentProfileBackend;
pub use error::DomainError;
pub use logger::{AuditLogger, BoxError, MemoryAuditLogger, format_payment_method};
pub use models::{Invoice, LogEntry, LogType, ParentProfile, PaymentMethod};
