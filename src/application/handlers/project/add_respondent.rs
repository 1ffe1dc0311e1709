//! AddRespondentHandler / RemoveRespondentHandler - project membership.

use std::sync::Arc;

use crate::domain::foundation::{
    AuditRecord, DomainError, Principal, ProjectId, RespondentId, Timestamp,
};
use crate::domain::project::Membership;
use crate::ports::{record_quietly, AuditLog, ProjectRepository};

#[derive(Debug, Clone)]
pub struct AddRespondentCommand {
    pub project_id: ProjectId,
    pub respondent_id: RespondentId,
    pub actor: Principal,
}

/// Adds a respondent of the project's client. Adding an existing member
/// (active or not) re-activates the same membership.
pub struct AddRespondentHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl AddRespondentHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(&self, cmd: AddRespondentCommand) -> Result<Membership, DomainError> {
        let membership = self
            .projects
            .add_member(cmd.project_id, cmd.respondent_id, Timestamp::now())
            .await?;
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "project.member_added", "project")
                .entity(cmd.project_id, None)
                .detail(serde_json::json!({ "respondent_id": cmd.respondent_id })),
        )
        .await;
        Ok(membership)
    }
}

#[derive(Debug, Clone)]
pub struct RemoveRespondentCommand {
    pub project_id: ProjectId,
    pub respondent_id: RespondentId,
    pub actor: Principal,
}

/// Deactivates a membership. Answers already written stay in place.
pub struct RemoveRespondentHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl RemoveRespondentHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(&self, cmd: RemoveRespondentCommand) -> Result<(), DomainError> {
        self.projects
            .remove_member(cmd.project_id, cmd.respondent_id)
            .await?;
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "project.member_removed", "project")
                .entity(cmd.project_id, None)
                .detail(serde_json::json!({ "respondent_id": cmd.respondent_id })),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::project::{CreateProjectCommand, CreateProjectHandler};
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::client::ClientDraft;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::project::Project;

    async fn project(fx: &Fixture) -> (Project, Vec<crate::domain::client::Respondent>) {
        let (_, tree) = fx.published_type("Cyber", &[("D", &[true])]).await;
        let (client, respondents) = fx.client_with(&["ana@acme.io"]).await;
        let created = CreateProjectHandler::new(fx.projects(), fx.audit_log())
            .handle(CreateProjectCommand {
                client_id: client.id,
                name: "Review".into(),
                description: None,
                evaluator_name: None,
                evaluator_email: None,
                version_ids: vec![tree.version.id()],
                actor: admin(),
            })
            .await
            .unwrap();
        (created.project, respondents)
    }

    #[tokio::test]
    async fn adding_twice_keeps_one_membership() {
        let fx = Fixture::new();
        let (project, respondents) = project(&fx).await;
        let handler = AddRespondentHandler::new(fx.projects(), fx.audit_log());
        let cmd = AddRespondentCommand {
            project_id: project.id(),
            respondent_id: respondents[0].id,
            actor: admin(),
        };

        handler.handle(cmd.clone()).await.unwrap();
        handler.handle(cmd).await.unwrap();

        let members = fx.projects().members(project.id()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].active);
    }

    #[tokio::test]
    async fn respondent_of_another_client_is_rejected() {
        let fx = Fixture::new();
        let (project, _) = project(&fx).await;
        let other = fx
            .clients()
            .create_client(
                &ClientDraft::new("Globex", None, None, None, None).unwrap(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        let outsider = fx
            .clients()
            .create_respondent(
                &crate::domain::client::RespondentDraft::new(
                    other.id,
                    "hank@globex.io",
                    "digest".into(),
                    "Hank",
                    None,
                    None,
                )
                .unwrap(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        let handler = AddRespondentHandler::new(fx.projects(), fx.audit_log());

        let err = handler
            .handle(AddRespondentCommand {
                project_id: project.id(),
                respondent_id: outsider.id,
                actor: admin(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn removal_deactivates_membership() {
        let fx = Fixture::new();
        let (project, respondents) = project(&fx).await;
        AddRespondentHandler::new(fx.projects(), fx.audit_log())
            .handle(AddRespondentCommand {
                project_id: project.id(),
                respondent_id: respondents[0].id,
                actor: admin(),
            })
            .await
            .unwrap();

        RemoveRespondentHandler::new(fx.projects(), fx.audit_log())
            .handle(RemoveRespondentCommand {
                project_id: project.id(),
                respondent_id: respondents[0].id,
                actor: admin(),
            })
            .await
            .unwrap();

        let members = fx.projects().members(project.id()).await.unwrap();
        assert!(!members[0].active);
        assert_eq!(
            fx.audit.actions().await,
            vec!["project.created", "project.member_added", "project.member_removed"]
        );
    }
}
