//! DeleteDraftHandler - discards an unused draft version.

use std::sync::Arc;

use crate::domain::foundation::{AuditRecord, DomainError, Principal, VersionId};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

#[derive(Debug, Clone)]
pub struct DeleteDraftCommand {
    pub version_id: VersionId,
    pub actor: Principal,
}

pub struct DeleteDraftHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl DeleteDraftHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: DeleteDraftCommand) -> Result<(), DomainError> {
        self.catalog.delete_draft(cmd.version_id).await?;
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "version.deleted", "assessment_version")
                .entity(cmd.version_id, None)
                .describe("Draft version deleted"),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::ErrorKind;

    #[tokio::test]
    async fn published_version_cannot_be_deleted() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let handler = DeleteDraftHandler::new(fx.catalog(), fx.audit_log());

        let err = handler
            .handle(DeleteDraftCommand {
                version_id: tree.version.id(),
                actor: admin(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEditable);
        assert!(fx.catalog().find_version(tree.version.id()).await.unwrap().is_some());
    }
}
