//! GetContactStepHandler - the contact capture page after the last domain.

use serde::Serialize;
use std::sync::Arc;

use super::context::load_session;
use crate::application::handlers::lookup::require_type;
use crate::domain::foundation::{DomainError, TypeId};
use crate::domain::public::{NextStep, SessionHandle};
use crate::ports::{CatalogRepository, IntakeSessionStore, PublicAssessmentRepository};

#[derive(Debug, Clone)]
pub struct GetContactStepQuery {
    pub type_id: TypeId,
    pub handle: SessionHandle,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactStep {
    pub type_id: TypeId,
    pub type_name: String,
    pub step_count: usize,
    /// Where the visitor should be; `contact` once every domain is submitted.
    pub expected: NextStep,
}

pub struct GetContactStepHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    sessions: Arc<dyn IntakeSessionStore>,
}

impl GetContactStepHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        sessions: Arc<dyn IntakeSessionStore>,
    ) -> Self {
        Self {
            catalog,
            public,
            sessions,
        }
    }

    pub async fn handle(&self, query: GetContactStepQuery) -> Result<ContactStep, DomainError> {
        let (session, assessment) = load_session(
            self.sessions.as_ref(),
            self.public.as_ref(),
            query.type_id,
            &query.handle,
        )
        .await?;
        assessment.ensure_open()?;
        let assessment_type = require_type(self.catalog.as_ref(), query.type_id).await?;

        Ok(ContactStep {
            type_id: query.type_id,
            type_name: assessment_type.name,
            step_count: session.step_count(),
            expected: session.resume_step(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::public::{StartIntakeCommand, StartIntakeHandler};
    use crate::application::handlers::testing::Fixture;
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn fresh_session_is_expected_on_first_domain() {
        let fx = Fixture::new();
        let (assessment_type, _) = fx
            .public_type("Cloud", &[("A", &[true]), ("B", &[true])], "")
            .await;
        let started = StartIntakeHandler::new(fx.catalog(), fx.public(), fx.sessions())
            .handle(StartIntakeCommand {
                type_id: assessment_type.id,
                group: None,
                source_ip: None,
                resume: None,
            })
            .await
            .unwrap();

        let step = GetContactStepHandler::new(fx.catalog(), fx.public(), fx.sessions())
            .handle(GetContactStepQuery {
                type_id: assessment_type.id,
                handle: started.session.handle,
            })
            .await
            .unwrap();

        assert_eq!(step.type_name, "Cloud");
        assert_eq!(step.step_count, 2);
        assert_eq!(step.expected, NextStep::Domain(0));
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let fx = Fixture::new();
        let (assessment_type, _) = fx.public_type("Cloud", &[("A", &[true])], "").await;

        let err = GetContactStepHandler::new(fx.catalog(), fx.public(), fx.sessions())
            .handle(GetContactStepQuery {
                type_id: assessment_type.id,
                handle: SessionHandle::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::IntakeSessionNotFound);
    }
}
