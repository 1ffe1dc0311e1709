//! GetDomainStepHandler - one step of the public questionnaire with the
//! visitor's stored answers for re-entry.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::{assessment_subset, load_session};
use crate::domain::catalog::Question;
use crate::domain::foundation::{round_to, DomainError, DomainId, ErrorCode, TypeId};
use crate::domain::public::SessionHandle;
use crate::domain::response::PublicAnswer;
use crate::ports::{
    CatalogRepository, IntakeSessionStore, PublicAssessmentRepository, ResponseRepository,
};

#[derive(Debug, Clone)]
pub struct GetDomainStepQuery {
    pub type_id: TypeId,
    pub handle: SessionHandle,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub answer: Option<PublicAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainStep {
    pub index: usize,
    pub step_count: usize,
    /// Share of steps already behind the visitor.
    pub percentage: f64,
    pub domain_id: DomainId,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<StepQuestion>,
}

pub struct GetDomainStepHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    responses: Arc<dyn ResponseRepository>,
    sessions: Arc<dyn IntakeSessionStore>,
}

impl GetDomainStepHandler {
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

    pub async fn handle(&self, query: GetDomainStepQuery) -> Result<DomainStep, DomainError> {
        let (session, assessment) = load_session(
            self.sessions.as_ref(),
            self.public.as_ref(),
            query.type_id,
            &query.handle,
        )
        .await?;
        assessment.ensure_open()?;

        let domain_id = session.domain_at(query.index)?;
        let subset = assessment_subset(self.catalog.as_ref(), &assessment).await?;
        let domain = subset.domain(domain_id).ok_or_else(|| {
            DomainError::not_found(ErrorCode::DomainNotFound, "Domain", domain_id)
        })?;

        let stored: HashMap<_, _> = self
            .responses
            .list_public_responses(assessment.id())
            .await?
            .into_iter()
            .map(|r| (r.question_id, r.value))
            .collect();

        Ok(DomainStep {
            index: query.index,
            step_count: session.step_count(),
            percentage: round_to(session.step_percentage(query.index), 1),
            domain_id,
            name: domain.name.clone(),
            description: domain.description.clone(),
            questions: domain
                .questions
                .iter()
                .map(|q| StepQuestion {
                    question: q.clone(),
                    answer: stored.get(&q.id).copied(),
                })
                .collect(),
        })
    }
}
