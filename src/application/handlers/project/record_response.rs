//! RecordResponseHandler - a member answers or un-answers a project question.

use std::sync::Arc;

use crate::application::handlers::access::require_respondent;
use crate::application::handlers::lookup::require_binding;
use crate::domain::foundation::{
    AuditRecord, DomainError, Principal, ProjectAssessmentId, QuestionId, Timestamp,
};
use crate::domain::project::{Membership, Progress};
use crate::domain::response::{ResponseWrite, WriteOutcome};
use crate::ports::{record_quietly, AuditLog, ProjectRepository, ResponseRepository};

/// `score == None` removes the project's answer to the question.
#[derive(Debug, Clone)]
pub struct RecordResponseCommand {
    pub binding_id: ProjectAssessmentId,
    pub question_id: QuestionId,
    pub score: Option<i32>,
    pub comment: Option<String>,
    pub actor: Principal,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordResponseResult {
    pub outcome: WriteOutcome,
    pub progress: Progress,
}

/// Answers are collaborative: one row per (project, question), last write
/// wins. The lock check and the write happen in one store operation.
pub struct RecordResponseHandler {
    projects: Arc<dyn ProjectRepository>,
    responses: Arc<dyn ResponseRepository>,
    audit: Arc<dyn AuditLog>,
}

impl RecordResponseHandler {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        responses: Arc<dyn ResponseRepository>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            projects,
            responses,
            audit,
        }
    }

    pub async fn handle(&self, cmd: RecordResponseCommand) -> Result<RecordResponseResult, DomainError> {
        // 1. Only active members write answers
        let respondent_id = require_respondent(&cmd.actor)?;
        let binding = require_binding(self.projects.as_ref(), cmd.binding_id).await?;
        let members = self.projects.members(binding.project_id()).await?;
        Membership::ensure_member(&members, binding.project_id(), respondent_id)?;

        // 2. Validate the write
        let write = ResponseWrite::new(
            binding.project_id(),
            cmd.question_id,
            respondent_id,
            cmd.score,
            cmd.comment,
            Timestamp::now(),
        )?;

        // 3. Apply under the binding lock
        let outcome = self
            .responses
            .upsert_project_response(binding.id(), &write)
            .await?;

        // 4. Audit effective changes
        let action = match &outcome {
            WriteOutcome::Stored(_) => Some("response.recorded"),
            WriteOutcome::Deleted => Some("response.cleared"),
            WriteOutcome::Unchanged | WriteOutcome::Superseded(_) => None,
        };
        if let Some(action) = action {
            record_quietly(
                self.audit.as_ref(),
                AuditRecord::by(&cmd.actor, action, "project_assessment")
                    .entity(binding.id(), None)
                    .from_ip(cmd.ip)
                    .detail(serde_json::json!({
                        "project_id": binding.project_id(),
                        "question_id": cmd.question_id,
                        "score": write.score,
                    })),
            )
            .await;
        }

        let progress = self.projects.progress(binding.id()).await?;
        Ok(RecordResponseResult { outcome, progress })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, principal_for, Fixture, ProjectSetup};
    use crate::domain::catalog::VersionTree;
    use crate::domain::foundation::ErrorCode;

    async fn setup(fx: &Fixture) -> (VersionTree, ProjectSetup) {
        let (_, tree) = fx.published_type("X", &[("D", &[true, false])]).await;
        let setup = fx
            .project_with_members(&[tree.version.id()], &["a@acme.io", "b@acme.io"])
            .await;
        (tree, setup)
    }

    fn command(
        setup: &ProjectSetup,
        who: usize,
        question_id: QuestionId,
        score: Option<i32>,
    ) -> RecordResponseCommand {
        RecordResponseCommand {
            binding_id: setup.bindings[0].id(),
            question_id,
            score,
            comment: None,
            actor: principal_for(&setup.respondents[who]),
            ip: None,
        }
    }

    fn handler(fx: &Fixture) -> RecordResponseHandler {
        RecordResponseHandler::new(fx.projects(), fx.responses(), fx.audit_log())
    }

    #[tokio::test]
    async fn answers_from_two_members_complete_the_binding() {
        let fx = Fixture::new();
        let (tree, setup) = setup(&fx).await;
        let q1 = tree.domains[0].questions[0].id;
        let q2 = tree.domains[0].questions[1].id;

        let first = handler(&fx).handle(command(&setup, 0, q1, Some(3))).await.unwrap();
        assert_eq!(first.progress.percentage(), 50.0);
        let second = handler(&fx).handle(command(&setup, 1, q2, Some(5))).await.unwrap();
        assert!(second.progress.is_complete());
    }

    #[tokio::test]
    async fn unanswer_reduces_progress() {
        let fx = Fixture::new();
        let (tree, setup) = setup(&fx).await;
        let q1 = tree.domains[0].questions[0].id;
        handler(&fx).handle(command(&setup, 0, q1, Some(3))).await.unwrap();

        let cleared = handler(&fx).handle(command(&setup, 1, q1, None)).await.unwrap();
        assert_eq!(cleared.outcome, WriteOutcome::Deleted);
        assert_eq!(cleared.progress.answered, 0);

        let again = handler(&fx).handle(command(&setup, 1, q1, None)).await.unwrap();
        assert_eq!(again.outcome, WriteOutcome::Unchanged);
        assert_eq!(
            fx.audit.actions().await,
            vec!["response.recorded", "response.cleared"]
        );
    }

    #[tokio::test]
    async fn later_write_from_another_member_wins() {
        let fx = Fixture::new();
        let (tree, setup) = setup(&fx).await;
        let q1 = tree.domains[0].questions[0].id;
        handler(&fx).handle(command(&setup, 0, q1, Some(1))).await.unwrap();
        handler(&fx).handle(command(&setup, 1, q1, Some(4))).await.unwrap();

        let rows = fx
            .responses()
            .list_project_responses(setup.project.id())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score.value(), 4);
        assert_eq!(rows[0].respondent_id, setup.respondents[1].id);
    }

    #[tokio::test]
    async fn non_members_and_admins_cannot_answer() {
        let fx = Fixture::new();
        let (tree, setup) = setup(&fx).await;
        let q1 = tree.domains[0].questions[0].id;
        fx.projects()
            .remove_member(setup.project.id(), setup.respondents[0].id)
            .await
            .unwrap();

        let removed = handler(&fx).handle(command(&setup, 0, q1, Some(2))).await.unwrap_err();
        assert_eq!(removed.code, ErrorCode::Forbidden);

        let mut as_admin = command(&setup, 1, q1, Some(2));
        as_admin.actor = admin();
        let err = handler(&fx).handle(as_admin).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn out_of_range_score_and_foreign_question_are_rejected() {
        let fx = Fixture::new();
        let (tree, setup) = setup(&fx).await;
        let (_, other) = fx.published_type("Y", &[("E", &[true])]).await;

        let bad_score = handler(&fx)
            .handle(command(&setup, 0, tree.domains[0].questions[0].id, Some(6)))
            .await
            .unwrap_err();
        assert_eq!(bad_score.details.get("field").map(String::as_str), Some("score"));

        let foreign = handler(&fx)
            .handle(command(&setup, 0, other.domains[0].questions[0].id, Some(2)))
            .await
            .unwrap_err();
        assert_eq!(foreign.details.get("field").map(String::as_str), Some("question_id"));
    }
}
