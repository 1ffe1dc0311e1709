//! CreateProjectHandler - opens an assessment engagement for a client.

use std::sync::Arc;

use crate::domain::foundation::{
    AuditRecord, ClientId, DomainError, Principal, Timestamp, VersionId,
};
use crate::domain::project::{Project, ProjectAssessment, ProjectDraft};
use crate::ports::{record_quietly, AuditLog, ProjectRepository};

#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    pub client_id: ClientId,
    pub name: String,
    pub description: Option<String>,
    pub evaluator_name: Option<String>,
    pub evaluator_email: Option<String>,
    pub version_ids: Vec<VersionId>,
    pub actor: Principal,
}

#[derive(Debug, Clone)]
pub struct CreateProjectResult {
    pub project: Project,
    pub bindings: Vec<ProjectAssessment>,
}

/// Every referenced version must be published at creation time. The
/// binding stays on that version even after it is archived.
pub struct CreateProjectHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl CreateProjectHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(&self, cmd: CreateProjectCommand) -> Result<CreateProjectResult, DomainError> {
        // 1. Validate input
        let draft = ProjectDraft::new(
            cmd.client_id,
            &cmd.name,
            cmd.description,
            cmd.evaluator_name,
            cmd.evaluator_email,
            cmd.version_ids,
        )?;

        // 2. Persist project and bindings (versions re-checked by the store)
        let (project, bindings) = self.projects.create(&draft, Timestamp::now()).await?;

        // 3. Audit
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "project.created", "project")
                .entity(project.id(), Some(project.name()))
                .describe(format!("Project '{}' created", project.name()))
                .detail(serde_json::json!({
                    "client_id": project.client_id(),
                    "version_ids": draft.version_ids,
                })),
        )
        .await;

        Ok(CreateProjectResult { project, bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::catalog::{CreateTypeCommand, CreateTypeHandler};
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::{ErrorCode, ErrorKind};

    fn command(client_id: ClientId, versions: Vec<VersionId>) -> CreateProjectCommand {
        CreateProjectCommand {
            client_id,
            name: "2026 review".into(),
            description: None,
            evaluator_name: Some("Eve".into()),
            evaluator_email: Some("eve@consult.io".into()),
            version_ids: versions,
            actor: admin(),
        }
    }

    #[tokio::test]
    async fn binds_each_published_version_once() {
        let fx = Fixture::new();
        let (_, cyber) = fx.published_type("Cyber", &[("D", &[true])]).await;
        let (_, privacy) = fx.published_type("Privacy", &[("D", &[true])]).await;
        let (client, _) = fx.client_with(&[]).await;
        let handler = CreateProjectHandler::new(fx.projects(), fx.audit_log());

        let result = handler
            .handle(command(
                client.id,
                vec![cyber.version.id(), privacy.version.id(), cyber.version.id()],
            ))
            .await
            .unwrap();

        assert_eq!(result.bindings.len(), 2);
        assert!(result.bindings.iter().all(|b| !b.is_finalized()));
        assert_eq!(fx.audit.actions().await, vec!["project.created"]);
    }

    #[tokio::test]
    async fn draft_version_cannot_be_bound() {
        let fx = Fixture::new();
        let created = CreateTypeHandler::new(fx.catalog(), fx.audit_log())
            .handle(CreateTypeCommand {
                name: "Cloud".into(),
                description: None,
                actor: admin(),
            })
            .await
            .unwrap();
        let (client, _) = fx.client_with(&[]).await;
        let handler = CreateProjectHandler::new(fx.projects(), fx.audit_log());

        let err = handler
            .handle(command(client.id, vec![created.version.id()]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    }

    #[tokio::test]
    async fn empty_version_list_and_unknown_client_are_rejected() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("Cyber", &[("D", &[true])]).await;
        let handler = CreateProjectHandler::new(fx.projects(), fx.audit_log());

        let empty = handler.handle(command(ClientId::new(1), vec![])).await.unwrap_err();
        assert_eq!(empty.code, ErrorCode::ValidationFailed);

        let unknown = handler
            .handle(command(ClientId::new(999), vec![tree.version.id()]))
            .await
            .unwrap_err();
        assert_eq!(unknown.code, ErrorCode::ClientNotFound);
    }
}
