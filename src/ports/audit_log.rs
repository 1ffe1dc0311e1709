//! Audit log port - append-only record of who did what.
//!
//! Callers log and swallow failures; auditing never fails a request.

use async_trait::async_trait;

use crate::domain::foundation::{AuditRecord, DomainError};

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<(), DomainError>;
}

/// Records `record`, logging instead of propagating a failure.
pub async fn record_quietly(log: &dyn AuditLog, record: AuditRecord) {
    let action = record.action.clone();
    if let Err(e) = log.record(record).await {
        tracing::warn!(action = %action, error = %e, "Failed to write audit record");
    }
}
