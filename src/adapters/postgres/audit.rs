//! PostgreSQL audit sink.

use async_trait::async_trait;
use sqlx::PgPool;

use super::db;
use crate::domain::foundation::{AuditRecord, DomainError};
use crate::ports::AuditLog;

/// Appends audit records to the `audit_log` table.
#[derive(Clone)]
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(&self, record: AuditRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (
                actor_kind, actor_id, action, entity_kind, entity_id, entity_name,
                description, detail, ip, at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.actor_kind.as_str())
        .bind(&record.actor_id)
        .bind(&record.action)
        .bind(&record.entity_kind)
        .bind(&record.entity_id)
        .bind(&record.entity_name)
        .bind(&record.description)
        .bind(&record.detail)
        .bind(&record.ip)
        .bind(record.at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db("write audit record"))?;
        Ok(())
    }
}
