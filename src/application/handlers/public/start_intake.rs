//! StartIntakeHandler - opens or resumes an anonymous assessment.

use std::sync::Arc;

use super::context::{load_intake, load_session};
use crate::domain::foundation::{DomainError, ErrorKind, Timestamp, TypeId};
use crate::domain::public::{
    GroupTag, IntakeSession, NextStep, PublicAssessmentDraft, ResultToken, SessionHandle,
};
use crate::ports::{CatalogRepository, IntakeSessionStore, PublicAssessmentRepository};

#[derive(Debug, Clone)]
pub struct StartIntakeCommand {
    pub type_id: TypeId,
    /// Raw `group` query parameter.
    pub group: Option<String>,
    pub source_ip: Option<String>,
    /// Handle the visitor already holds for this type, if any.
    pub resume: Option<SessionHandle>,
}

#[derive(Debug, Clone)]
pub struct StartIntakeResult {
    pub session: IntakeSession,
    pub step: NextStep,
    pub resumed: bool,
}

pub struct StartIntakeHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    sessions: Arc<dyn IntakeSessionStore>,
}

impl StartIntakeHandler {
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

    pub async fn handle(&self, cmd: StartIntakeCommand) -> Result<StartIntakeResult, DomainError> {
        // 1. The type must currently accept visitors
        let context = load_intake(self.catalog.as_ref(), cmd.type_id).await?;

        // 2. A live, unfinished session for the same type is resumed
        if let Some(handle) = cmd.resume {
            match load_session(
                self.sessions.as_ref(),
                self.public.as_ref(),
                cmd.type_id,
                &handle,
            )
            .await
            {
                Ok((session, assessment)) if !assessment.is_completed() => {
                    let step = session.resume_step();
                    return Ok(StartIntakeResult {
                        session,
                        step,
                        resumed: true,
                    });
                }
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }

        // 3. Otherwise open a new assessment on the published version
        let group_tag = GroupTag::parse(cmd.group.as_deref())?;
        let now = Timestamp::now();
        let assessment = self
            .public
            .create(PublicAssessmentDraft {
                type_id: cmd.type_id,
                version_id: context.tree.version.id(),
                token: ResultToken::generate(),
                group_tag,
                source_ip: cmd.source_ip,
                started_at: now,
            })
            .await?;
        let session = IntakeSession::start(cmd.type_id, assessment.id(), &context.subset, now);
        self.sessions.save(&session).await?;

        tracing::info!(
            public_assessment_id = %assessment.id(),
            type_id = %cmd.type_id,
            group = assessment.group_tag().map(|g| g.as_str()).unwrap_or("General"),
            steps = session.step_count(),
            "Public assessment started"
        );
        Ok(StartIntakeResult {
            step: session.resume_step(),
            session,
            resumed: false,
        })
    }
}
