//! Storage collaborator for the parent profile backend.
//!
//! Exposes the [`ProfileStore`] trait consumed by the API layer, a
//! PostgreSQL implementation with parameterized queries and a pooled
//! connection, a PostgreSQL [`AuditLogger`](domain::AuditLogger)
//! implementation, and an in-memory implementation for tests.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryProfileStore;
pub use postgres::{PostgresAuditLogger, PostgresProfileStore};
pub use store::ProfileStore;
