//! CreateTypeHandler - Command handler for registering a new assessment type.

use std::sync::Arc;

use crate::domain::catalog::{
    AssessmentType, AssessmentVersion, TypeDraft, VersionBlueprint, VersionDraft,
};
use crate::domain::foundation::{AuditRecord, DomainError, Principal, Timestamp};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

/// Command to create a type together with its empty draft "1.0".
#[derive(Debug, Clone)]
pub struct CreateTypeCommand {
    pub name: String,
    pub description: Option<String>,
    pub actor: Principal,
}

#[derive(Debug, Clone)]
pub struct CreateTypeResult {
    pub assessment_type: AssessmentType,
    pub version: AssessmentVersion,
}

pub struct CreateTypeHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl CreateTypeHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: CreateTypeCommand) -> Result<CreateTypeResult, DomainError> {
        // 1. Validate input
        let draft = TypeDraft::new(&cmd.name, cmd.description)?;

        // 2. Persist type and initial draft
        let (assessment_type, version) = self
            .catalog
            .create_type(
                &draft,
                &VersionDraft::initial(Some(cmd.actor.display_name().to_string())),
                &VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await?;

        // 3. Audit
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "type.created", "assessment_type")
                .entity(assessment_type.id, Some(&assessment_type.name))
                .describe(format!("Assessment type '{}' created", assessment_type.name)),
        )
        .await;

        Ok(CreateTypeResult {
            assessment_type,
            version,
        })
    }
}
