use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuditRecord, DomainError};
use crate::ports::AuditLog;

/// Keeps audit records in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Actions recorded so far, in order.
    pub async fn actions(&self) -> Vec<String> {
        self.records
            .read()
            .await
            .iter()
            .map(|r| r.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, record: AuditRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
