//! ReleaseProjectHandler - makes a completed project's results visible to the client.

use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::domain::foundation::{AuditRecord, DomainError, Principal, ProjectId, Timestamp};
use crate::domain::project::Project;
use crate::ports::{record_quietly, AuditLog, ProjectRepository};

#[derive(Debug, Clone)]
pub struct ReleaseProjectCommand {
    pub project_id: ProjectId,
    pub actor: Principal,
}

#[derive(Debug, Clone)]
pub struct ReleaseProjectResult {
    pub project: Project,
    /// `false` when the project had already been released.
    pub changed: bool,
}

pub struct ReleaseProjectHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl ReleaseProjectHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(&self, cmd: ReleaseProjectCommand) -> Result<ReleaseProjectResult, DomainError> {
        require_admin(&cmd.actor)?;
        let (project, changed) = self
            .projects
            .release(cmd.project_id, Timestamp::now())
            .await?;

        if changed {
            tracing::info!(project_id = %project.id(), "Project released to client");
            record_quietly(
                self.audit.as_ref(),
                AuditRecord::by(&cmd.actor, "project.released", "project")
                    .entity(project.id(), Some(project.name()))
                    .describe("Results released to client"),
            )
            .await;
        }
        Ok(ReleaseProjectResult { project, changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::{ErrorKind, QuestionId};
    use crate::domain::response::ResponseWrite;

    #[tokio::test]
    async fn release_requires_every_binding_finalized_and_is_idempotent() {
        let fx = Fixture::new();
        let (_, a) = fx.published_type("A", &[("D", &[true])]).await;
        let (_, b) = fx.published_type("B", &[("D", &[true])]).await;
        let setup = fx
            .project_with_members(&[a.version.id(), b.version.id()], &["m@acme.io"])
            .await;
        let handler = ReleaseProjectHandler::new(fx.projects(), fx.audit_log());
        let cmd = ReleaseProjectCommand {
            project_id: setup.project.id(),
            actor: admin(),
        };
        let answer = |binding: usize, question: QuestionId| {
            ResponseWrite::new(
                setup.project.id(),
                question,
                setup.respondents[0].id,
                Some(4),
                None,
                Timestamp::now(),
            )
            .map(|write| (setup.bindings[binding].id(), write))
            .unwrap()
        };

        let (binding, write) = answer(0, a.domains[0].questions[0].id);
        fx.responses().upsert_project_response(binding, &write).await.unwrap();
        fx.projects().finalize_binding(binding, Timestamp::now()).await.unwrap();

        let err = handler.handle(cmd.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

        let (binding, write) = answer(1, b.domains[0].questions[0].id);
        fx.responses().upsert_project_response(binding, &write).await.unwrap();
        fx.projects().finalize_binding(binding, Timestamp::now()).await.unwrap();

        let first = handler.handle(cmd.clone()).await.unwrap();
        assert!(first.changed);
        assert!(first.project.is_released());
        assert!(first.project.finalized_at().is_some());

        let second = handler.handle(cmd).await.unwrap();
        assert!(!second.changed);
        assert_eq!(second.project.released_at(), first.project.released_at());
        assert_eq!(fx.audit.actions().await, vec!["project.released"]);
    }
}
