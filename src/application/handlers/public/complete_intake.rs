//! CompleteIntakeHandler - contact capture, completion and lead creation.

use std::sync::Arc;

use super::context::load_session;
use crate::application::handlers::lead::{MaterializeLeadCommand, MaterializeLeadHandler};
use crate::domain::foundation::{ActorKind, AuditRecord, DomainError, Timestamp, TypeId};
use crate::domain::lead::Lead;
use crate::domain::public::{ContactDetails, ContactInput, PublicAssessment, SessionHandle};
use crate::ports::{record_quietly, AuditLog, IntakeSessionStore, PublicAssessmentRepository};

#[derive(Debug, Clone)]
pub struct CompleteIntakeCommand {
    pub type_id: TypeId,
    pub handle: SessionHandle,
    pub contact: ContactInput,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompleteIntakeResult {
    pub assessment: PublicAssessment,
    pub lead: Lead,
    /// `false` when the assessment had already been completed.
    pub completed_now: bool,
}

/// Repeating the call is a no-op for the assessment; the lead step is
/// re-run, which finds the existing lead.
pub struct CompleteIntakeHandler {
    public: Arc<dyn PublicAssessmentRepository>,
    sessions: Arc<dyn IntakeSessionStore>,
    materialize: Arc<MaterializeLeadHandler>,
    audit: Arc<dyn AuditLog>,
}

impl CompleteIntakeHandler {
    pub fn new(
        public: Arc<dyn PublicAssessmentRepository>,
        sessions: Arc<dyn IntakeSessionStore>,
        materialize: Arc<MaterializeLeadHandler>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            public,
            sessions,
            materialize,
            audit,
        }
    }

    pub async fn handle(&self, cmd: CompleteIntakeCommand) -> Result<CompleteIntakeResult, DomainError> {
        // 1. Resolve the visitor's assessment
        let (_, assessment) = load_session(
            self.sessions.as_ref(),
            self.public.as_ref(),
            cmd.type_id,
            &cmd.handle,
        )
        .await?;

        // 2. Record contact and completion, once
        let (assessment, completed_now) = if assessment.is_completed() {
            (assessment, false)
        } else {
            let contact = ContactDetails::parse(cmd.contact)?;
            self.public
                .complete(assessment.id(), contact, Timestamp::now())
                .await?
        };

        if completed_now {
            tracing::info!(
                public_assessment_id = %assessment.id(),
                type_id = %assessment.type_id(),
                "Public assessment completed"
            );
            record_quietly(
                self.audit.as_ref(),
                AuditRecord::anonymous(
                    ActorKind::Public,
                    "public_assessment.completed",
                    "public_assessment",
                )
                .entity(assessment.id(), assessment.contact().name.as_deref())
                .from_ip(cmd.ip),
            )
            .await;
        }

        // 3. Hand over to the lead pipeline
        let lead = self
            .materialize
            .handle(MaterializeLeadCommand {
                public_assessment_id: assessment.id(),
            })
            .await?
            .lead;

        Ok(CompleteIntakeResult {
            assessment,
            lead,
            completed_now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::public::{
        FetchResultHandler, FetchResultQuery, GetDomainStepHandler, GetDomainStepQuery,
        StartIntakeCommand, StartIntakeHandler, SubmitDomainCommand, SubmitDomainHandler,
    };
    use crate::application::handlers::testing::Fixture;
    use crate::domain::foundation::{ErrorCode, ErrorKind, QuestionId};
    use crate::domain::public::NextStep;

    struct Flow {
        fx: Fixture,
        type_id: TypeId,
        questions: Vec<Vec<QuestionId>>,
    }

    impl Flow {
        async fn new() -> Self {
            let fx = Fixture::new();
            let (assessment_type, tree) = fx
                .public_type(
                    "Cyber",
                    &[("Identity", &[true, true]), ("Network", &[false]), ("Cloud", &[true])],
                    "sales@firm.io",
                )
                .await;
            let questions = tree
                .light_subset()
                .domains
                .iter()
                .map(|d| d.questions.iter().map(|q| q.id).collect())
                .collect();
            Self {
                fx,
                type_id: assessment_type.id,
                questions,
            }
        }

        async fn start(&self, group: Option<&str>) -> SessionHandle {
            StartIntakeHandler::new(self.fx.catalog(), self.fx.public(), self.fx.sessions())
                .handle(StartIntakeCommand {
                    type_id: self.type_id,
                    group: group.map(str::to_string),
                    source_ip: None,
                    resume: None,
                })
                .await
                .unwrap()
                .session
                .handle
        }

        fn submitter(&self) -> SubmitDomainHandler {
            SubmitDomainHandler::new(
                self.fx.catalog(),
                self.fx.public(),
                self.fx.responses(),
                self.fx.sessions(),
            )
        }

        async fn submit(
            &self,
            handle: SessionHandle,
            index: usize,
            answers: Vec<(QuestionId, i32)>,
        ) -> Result<NextStep, DomainError> {
            self.submitter()
                .handle(SubmitDomainCommand {
                    type_id: self.type_id,
                    handle,
                    index,
                    answers,
                })
                .await
        }

        fn completer(&self) -> CompleteIntakeHandler {
            let fx = &self.fx;
            CompleteIntakeHandler::new(
                fx.public(),
                fx.sessions(),
                Arc::new(MaterializeLeadHandler::new(
                    fx.catalog(),
                    fx.public(),
                    fx.responses(),
                    fx.leads(),
                    fx.notifier_port(),
                    fx.audit_log(),
                )),
                fx.audit_log(),
            )
        }

        async fn complete(
            &self,
            handle: SessionHandle,
            email: Option<&str>,
        ) -> Result<CompleteIntakeResult, DomainError> {
            self.completer()
                .handle(CompleteIntakeCommand {
                    type_id: self.type_id,
                    handle,
                    contact: ContactInput {
                        name: Some("Dana".into()),
                        email: email.map(str::to_string),
                        ..Default::default()
                    },
                    ip: None,
                })
                .await
        }
    }

    #[tokio::test]
    async fn full_flow_produces_one_lead_and_result() {
        let flow = Flow::new().await;
        let handle = flow.start(Some("campaign-Q3")).await;
        let q = &flow.questions;

        assert_eq!(
            flow.submit(handle, 0, vec![(q[0][0], 5), (q[0][1], 3)]).await.unwrap(),
            NextStep::Domain(1)
        );
        assert_eq!(
            flow.submit(handle, 1, vec![(q[1][0], 0)]).await.unwrap(),
            NextStep::Contact
        );

        let done = flow.complete(handle, Some("dana@acme.io")).await.unwrap();
        assert!(done.completed_now);
        assert_eq!(done.lead.overall_score, 53.3);
        assert_eq!(flow.fx.notifier.lead_notices().await.len(), 1);

        let fx = &flow.fx;
        let result = FetchResultHandler::new(fx.catalog(), fx.public(), fx.responses(), None)
            .handle(FetchResultQuery {
                type_id: Some(flow.type_id),
                token: done.assessment.token().to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.overall, 53.3);
        assert_eq!(result.domains[0].score, 80.0);
        assert_eq!(result.domains[1].score, 0.0);
        assert_eq!(result.cta_text.as_deref(), Some("Book a call"));
        assert!(result.domains[0].recommendation.contains("Identity"));
    }

    #[tokio::test]
    async fn second_completion_is_a_no_op() {
        let flow = Flow::new().await;
        let handle = flow.start(None).await;
        flow.submit(handle, 0, vec![(flow.questions[0][0], 5)]).await.unwrap();

        let first = flow.complete(handle, Some("dana@acme.io")).await.unwrap();
        let second = flow.complete(handle, Some("other@acme.io")).await.unwrap();

        assert!(!second.completed_now);
        assert_eq!(first.lead.id, second.lead.id);
        assert_eq!(
            second.assessment.contact().email.as_ref().map(|e| e.as_str()),
            Some("dana@acme.io")
        );
        assert_eq!(flow.fx.store.history_row_count().await, 1);
        assert_eq!(flow.fx.notifier.lead_notices().await.len(), 1);
    }

    #[tokio::test]
    async fn completion_requires_email_and_locks_answers() {
        let flow = Flow::new().await;
        let handle = flow.start(None).await;

        let err = flow.complete(handle, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEmail);

        flow.complete(handle, Some("dana@acme.io")).await.unwrap();
        let err = flow
            .submit(handle, 0, vec![(flow.questions[0][0], 3)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssessmentCompleted);
    }

    #[tokio::test]
    async fn bad_value_rejects_the_whole_step() {
        let flow = Flow::new().await;
        let handle = flow.start(None).await;
        let q = &flow.questions;

        let err = flow
            .submit(handle, 0, vec![(q[0][0], 5), (q[0][1], 4)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(flow.fx.store.public_response_row_count().await, 0);

        let err = flow.submit(handle, 0, vec![(q[1][0], 5)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn step_view_returns_stored_answers() {
        let flow = Flow::new().await;
        let handle = flow.start(None).await;
        flow.submit(handle, 0, vec![(flow.questions[0][1], 3)]).await.unwrap();

        let step = GetDomainStepHandler::new(
            flow.fx.catalog(),
            flow.fx.public(),
            flow.fx.responses(),
            flow.fx.sessions(),
        )
        .handle(GetDomainStepQuery {
            type_id: flow.type_id,
            handle,
            index: 0,
        })
        .await
        .unwrap();

        assert_eq!(step.name, "Identity");
        assert_eq!(step.step_count, 2);
        assert_eq!(step.percentage, 0.0);
        assert_eq!(step.questions[0].answer, None);
        assert_eq!(
            step.questions[1].answer,
            Some(crate::domain::response::PublicAnswer::Partial)
        );
    }
}
