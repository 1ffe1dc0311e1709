//! PublishVersionHandler - makes a draft the live questionnaire of its type.

use std::sync::Arc;

use crate::domain::catalog::AssessmentVersion;
use crate::domain::foundation::{AuditRecord, DomainError, Principal, Timestamp, VersionId};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

#[derive(Debug, Clone)]
pub struct PublishVersionCommand {
    pub version_id: VersionId,
    pub actor: Principal,
}

/// Publishing archives the previously published version of the same type
/// in the same atomic step.
pub struct PublishVersionHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl PublishVersionHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: PublishVersionCommand) -> Result<AssessmentVersion, DomainError> {
        let version = self
            .catalog
            .publish_version(cmd.version_id, Timestamp::now())
            .await?;

        tracing::info!(
            version_id = %version.id(),
            type_id = %version.type_id(),
            label = %version.label(),
            "Version published"
        );
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "version.published", "assessment_version")
                .entity(version.id(), Some(version.label()))
                .describe(format!("Version {} published", version.label()))
                .detail(serde_json::json!({ "type_id": version.type_id() })),
        )
        .await;

        Ok(version)
    }
}
