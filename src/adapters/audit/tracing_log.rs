use async_trait::async_trait;

use crate::domain::foundation::{AuditRecord, DomainError};
use crate::ports::AuditLog;

/// Emits every audit record as an `info` event on the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, record: AuditRecord) -> Result<(), DomainError> {
        tracing::info!(
            target: "audit",
            actor_kind = record.actor_kind.as_str(),
            actor_id = record.actor_id.as_deref().unwrap_or("-"),
            action = %record.action,
            entity_kind = %record.entity_kind,
            entity_id = record.entity_id.as_deref().unwrap_or("-"),
            ip = record.ip.as_deref().unwrap_or("-"),
            detail = %record.detail,
            "{}",
            record.description
        );
        Ok(())
    }
}
