//! SubmitDomainHandler - stores the answers of one step and moves on.

use std::sync::Arc;

use super::context::{assessment_subset, load_session};
use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, Timestamp, TypeId};
use crate::domain::public::{NextStep, SessionHandle};
use crate::domain::response::{PublicAnswer, PublicResponse};
use crate::ports::{
    CatalogRepository, IntakeSessionStore, PublicAssessmentRepository, ResponseRepository,
};

#[derive(Debug, Clone)]
pub struct SubmitDomainCommand {
    pub type_id: TypeId,
    pub handle: SessionHandle,
    pub index: usize,
    /// Raw `(question, value)` pairs; fewer answers than questions is fine.
    pub answers: Vec<(QuestionId, i32)>,
}

/// A submission is validated as a whole before anything is written, so a
/// bad value leaves every earlier answer of the step untouched.
pub struct SubmitDomainHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    responses: Arc<dyn ResponseRepository>,
    sessions: Arc<dyn IntakeSessionStore>,
}

impl SubmitDomainHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        responses: Arc<dyn ResponseRepository>,
        sessions: Arc<dyn IntakeSessionStore>,
    ) -> Self {
        Self {
            catalog,
            public,
            responses,
            sessions,
        }
    }

    pub async fn handle(&self, cmd: SubmitDomainCommand) -> Result<NextStep, DomainError> {
        // 1. Resolve the step
        let (mut session, assessment) = load_session(
            self.sessions.as_ref(),
            self.public.as_ref(),
            cmd.type_id,
            &cmd.handle,
        )
        .await?;
        assessment.ensure_open()?;
        let domain_id = session.domain_at(cmd.index)?;
        let subset = assessment_subset(self.catalog.as_ref(), &assessment).await?;
        let domain = subset.domain(domain_id).ok_or_else(|| {
            DomainError::not_found(ErrorCode::DomainNotFound, "Domain", domain_id)
        })?;

        // 2. Validate every answer before writing any
        let now = Timestamp::now();
        let mut batch = Vec::with_capacity(cmd.answers.len());
        for (question_id, value) in cmd.answers {
            if !domain.questions.iter().any(|q| q.id == question_id) {
                return Err(DomainError::validation(
                    "question_id",
                    format!("Question {} is not part of this step", question_id),
                ));
            }
            batch.push(PublicResponse {
                public_assessment_id: assessment.id(),
                question_id,
                value: PublicAnswer::from_value(value)?,
                answered_at: now,
            });
        }

        // 3. Write and advance
        if !batch.is_empty() {
            self.responses
                .upsert_public_responses(assessment.id(), &batch)
                .await?;
        }
        let next = session.advance(cmd.index);
        self.sessions.save(&session).await?;
        Ok(next)
    }
}
