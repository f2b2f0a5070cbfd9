//! PostgreSQL-backed store and audit logger.

use async_trait::async_trait;
use common::{InvoiceId, LogEntryId, ParentId, PaymentMethodId};
use domain::{AuditLogger, BoxError, Invoice, LogEntry, ParentProfile, PaymentMethod};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, store::ProfileStore};

/// PostgreSQL-backed profile store.
///
/// All queries are parameterized; the pool bounds concurrent
/// connections.
#[derive(Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Creates a new PostgreSQL profile store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_parent_profile(row: PgRow) -> Result<ParentProfile> {
        Ok(ParentProfile {
            id: ParentId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            child: row.try_get("child")?,
        })
    }

    fn row_to_invoice(row: PgRow) -> Result<Invoice> {
        Ok(Invoice {
            id: InvoiceId::new(row.try_get("id")?),
            parent_id: ParentId::new(row.try_get("parent_id")?),
            amount: row.try_get("amount")?,
            date: row.try_get("date")?,
        })
    }

    fn row_to_payment_method(row: PgRow) -> Result<PaymentMethod> {
        Ok(PaymentMethod {
            id: PaymentMethodId::new(row.try_get("id")?),
            parent_id: ParentId::new(row.try_get("parent_id")?),
            method: row.try_get("method")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    #[tracing::instrument(skip(self))]
    async fn retrieve_parent_profiles(&self, parent_id: ParentId) -> Result<Vec<ParentProfile>> {
        let rows = sqlx::query("SELECT id, name, child FROM parents WHERE id = $1")
            .bind(parent_id.as_i64())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_parent_profile).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve_invoices(&self, parent_id: ParentId) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(
            "SELECT id, parent_id, amount, date FROM invoices WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_invoice).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve_payment_methods(&self, parent_id: ParentId) -> Result<Vec<PaymentMethod>> {
        let rows = sqlx::query(
            "SELECT id, parent_id, method, is_active FROM payment_methods \
             WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_payment_method).collect()
    }

    #[tracing::instrument(skip(self, payment_method))]
    async fn create_payment_method(
        &self,
        payment_method: &PaymentMethod,
    ) -> Result<PaymentMethod> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO payment_methods (parent_id, method, is_active) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(payment_method.parent_id.as_i64())
        .bind(&payment_method.method)
        .bind(payment_method.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaymentMethod {
            id: PaymentMethodId::new(id),
            ..payment_method.clone()
        })
    }

    #[tracing::instrument(skip(self, payment_methods))]
    async fn update_payment_methods(&self, payment_methods: &[PaymentMethod]) -> Result<u64> {
        let mut affected = 0;
        for payment_method in payment_methods {
            let result = sqlx::query(
                "UPDATE payment_methods SET parent_id = $1, method = $2, is_active = $3 \
                 WHERE id = $4",
            )
            .bind(payment_method.parent_id.as_i64())
            .bind(&payment_method.method)
            .bind(payment_method.is_active)
            .bind(payment_method.id.as_i64())
            .execute(&self.pool)
            .await?;
            affected += result.rows_affected();
        }
        Ok(affected)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_payment_method(&self, method_id: PaymentMethodId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
            .bind(method_id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// PostgreSQL-backed audit logger writing to the `logs` table.
#[derive(Clone)]
pub struct PostgresAuditLogger {
    pool: PgPool,
}

impl PostgresAuditLogger {
    /// Creates a new PostgreSQL audit logger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogger for PostgresAuditLogger {
    async fn log(&self, entry: LogEntry) -> std::result::Result<LogEntry, BoxError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO logs (parent_id, log_type, message) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(entry.parent_id.as_i64())
        .bind(entry.log_type.as_str())
        .bind(&entry.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Box::new(e) as BoxError)?;

        Ok(LogEntry {
            id: Some(LogEntryId::new(id)),
            ..entry
        })
    }
}
