//! CloneTypeHandler - copies the published questionnaire of one type into a new type.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_tree, require_type};
use crate::domain::catalog::{AssessmentType, AssessmentVersion, TypeDraft, VersionDraft};
use crate::domain::foundation::{AuditRecord, DomainError, Principal, Timestamp, TypeId};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

#[derive(Debug, Clone)]
pub struct CloneTypeCommand {
    pub source_type_id: TypeId,
    pub name: String,
    pub description: Option<String>,
    pub actor: Principal,
}

#[derive(Debug, Clone)]
pub struct CloneTypeResult {
    pub assessment_type: AssessmentType,
    pub version: AssessmentVersion,
}

/// The new type's draft "1.0" is a deep copy of the source's published
/// version; the two types share nothing afterwards.
pub struct CloneTypeHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl CloneTypeHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: CloneTypeCommand) -> Result<CloneTypeResult, DomainError> {
        let draft = TypeDraft::new(&cmd.name, cmd.description)?;

        // 1. Resolve the source and its published version
        let source = require_type(self.catalog.as_ref(), cmd.source_type_id).await?;
        let published = self.catalog.find_published(source.id).await?.ok_or_else(|| {
            DomainError::precondition(format!(
                "Assessment type '{}' has no published version to clone",
                source.name
            ))
        })?;
        let tree = require_tree(self.catalog.as_ref(), published.id()).await?;

        // 2. Create the copy
        let mut version_draft = VersionDraft::initial(Some(cmd.actor.display_name().to_string()));
        version_draft.notes = Some(format!(
            "Cloned from '{}' version {}",
            source.name,
            published.label()
        ));
        let (assessment_type, version) = self
            .catalog
            .create_type(&draft, &version_draft, &tree.blueprint(), Timestamp::now())
            .await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "type.cloned", "assessment_type")
                .entity(assessment_type.id, Some(&assessment_type.name))
                .describe(format!(
                    "Assessment type '{}' cloned from '{}'",
                    assessment_type.name, source.name
                ))
                .detail(serde_json::json!({
                    "source_type_id": source.id,
                    "source_version_id": published.id(),
                })),
        )
        .await;

        Ok(CloneTypeResult {
            assessment_type,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::catalog::VersionStatus;
    use crate::domain::foundation::ErrorCode;

    fn command(source: TypeId, name: &str) -> CloneTypeCommand {
        CloneTypeCommand {
            source_type_id: source,
            name: name.into(),
            description: None,
            actor: admin(),
        }
    }

    #[tokio::test]
    async fn clone_copies_published_structure_into_new_draft() {
        let fx = Fixture::new();
        let (source, source_tree) = fx
            .published_type("Cyber", &[("Identity", &[true, false]), ("Network", &[true])])
            .await;
        let handler = CloneTypeHandler::new(fx.catalog(), fx.audit_log());

        let result = handler.handle(command(source.id, "Cyber (EU)")).await.unwrap();

        assert_ne!(result.assessment_type.id, source.id);
        assert_eq!(result.version.status(), VersionStatus::Draft);
        let tree = fx.catalog().load_tree(result.version.id()).await.unwrap().unwrap();
        assert_eq!(tree.totals(), source_tree.totals());
        assert_eq!(tree.blueprint(), source_tree.blueprint());
    }

    #[tokio::test]
    async fn source_without_published_version_is_rejected() {
        let fx = Fixture::new();
        let (draft_only, _) = fx
            .catalog()
            .create_type(
                &TypeDraft::new("Draft only", None).unwrap(),
                &VersionDraft::initial(None),
                &crate::domain::catalog::VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        let handler = CloneTypeHandler::new(fx.catalog(), fx.audit_log());

        let err = handler.handle(command(draft_only.id, "Copy")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionFailed);
    }

    #[tokio::test]
    async fn taken_name_is_rejected() {
        let fx = Fixture::new();
        let (source, _) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let handler = CloneTypeHandler::new(fx.catalog(), fx.audit_log());

        let err = handler.handle(command(source.id, "CYBER")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeNameTaken);
    }
}
