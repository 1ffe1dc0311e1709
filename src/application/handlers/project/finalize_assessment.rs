//! FinalizeAssessmentHandler - locks a fully answered binding.

use std::sync::Arc;

use crate::application::handlers::access::authorize_project;
use crate::application::handlers::lookup::{require_binding, require_project};
use crate::domain::foundation::{
    AuditRecord, DomainError, Principal, ProjectAssessmentId, Timestamp,
};
use crate::domain::project::ProjectAssessment;
use crate::ports::{record_quietly, AuditLog, ProjectRepository};

#[derive(Debug, Clone)]
pub struct FinalizeAssessmentCommand {
    pub binding_id: ProjectAssessmentId,
    pub actor: Principal,
    pub ip: Option<String>,
}

/// Finalization requires 100% progress and succeeds once; afterwards every
/// answer write on the binding fails with `LOCKED_ASSESSMENT`.
pub struct FinalizeAssessmentHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl FinalizeAssessmentHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(
        &self,
        cmd: FinalizeAssessmentCommand,
    ) -> Result<ProjectAssessment, DomainError> {
        // 1. Authorize
        let binding = require_binding(self.projects.as_ref(), cmd.binding_id).await?;
        let project = require_project(self.projects.as_ref(), binding.project_id()).await?;
        authorize_project(self.projects.as_ref(), &cmd.actor, &project).await?;

        // 2. Progress check and transition happen atomically in the store
        let finalized = self
            .projects
            .finalize_binding(binding.id(), Timestamp::now())
            .await?;

        tracing::info!(
            binding_id = %finalized.id(),
            project_id = %project.id(),
            "Project assessment finalized"
        );
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "project_assessment.finalized", "project_assessment")
                .entity(finalized.id(), Some(project.name()))
                .describe("Assessment finalized")
                .from_ip(cmd.ip)
                .detail(serde_json::json!({
                    "project_id": project.id(),
                    "version_id": finalized.version_id(),
                })),
        )
        .await;
        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::project::{RecordResponseCommand, RecordResponseHandler};
    use crate::application::handlers::testing::{admin, principal_for, Fixture};
    use crate::domain::foundation::{ErrorCode, ErrorKind};

    #[tokio::test]
    async fn finalize_needs_full_progress_then_locks() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("X", &[("D", &[true, false])]).await;
        let setup = fx
            .project_with_members(&[tree.version.id()], &["a@acme.io", "b@acme.io"])
            .await;
        let answer = RecordResponseHandler::new(fx.projects(), fx.responses(), fx.audit_log());
        let finalize = FinalizeAssessmentHandler::new(fx.projects(), fx.audit_log());
        let record = |who: usize, q: usize, score: Option<i32>| RecordResponseCommand {
            binding_id: setup.bindings[0].id(),
            question_id: tree.domains[0].questions[q].id,
            score,
            comment: None,
            actor: principal_for(&setup.respondents[who]),
            ip: None,
        };
        let cmd = FinalizeAssessmentCommand {
            binding_id: setup.bindings[0].id(),
            actor: principal_for(&setup.respondents[0]),
            ip: None,
        };

        answer.handle(record(0, 0, Some(3))).await.unwrap();
        let early = finalize.handle(cmd.clone()).await.unwrap_err();
        assert_eq!(early.kind(), ErrorKind::PreconditionFailed);

        answer.handle(record(1, 1, Some(5))).await.unwrap();
        let finalized = finalize.handle(cmd.clone()).await.unwrap();
        assert!(finalized.is_finalized());

        let twice = finalize.handle(cmd).await.unwrap_err();
        assert_eq!(twice.kind(), ErrorKind::PreconditionFailed);

        for (who, q, score) in [(0, 0, Some(1)), (1, 1, None)] {
            let err = answer.handle(record(who, q, score)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::LockedAssessment);
        }
    }

    #[tokio::test]
    async fn outsiders_cannot_finalize() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("X", &[("D", &[true])]).await;
        let setup = fx.project_with_members(&[tree.version.id()], &[]).await;
        let (_, strangers) = fx.client_with(&["s@globex.io"]).await;

        let err = FinalizeAssessmentHandler::new(fx.projects(), fx.audit_log())
            .handle(FinalizeAssessmentCommand {
                binding_id: setup.bindings[0].id(),
                actor: principal_for(&strangers[0]),
                ip: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let by_admin = FinalizeAssessmentHandler::new(fx.projects(), fx.audit_log())
            .handle(FinalizeAssessmentCommand {
                binding_id: setup.bindings[0].id(),
                actor: admin(),
                ip: None,
            })
            .await
            .unwrap_err();
        assert_eq!(by_admin.kind(), ErrorKind::PreconditionFailed);
    }
}
