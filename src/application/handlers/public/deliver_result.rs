//! DeliverResultHandler - emails a visitor their result summary.

use std::sync::Arc;

use super::fetch_result::{find_by_token, ResultBuilder};
use crate::application::handlers::lead::{MaterializeLeadCommand, MaterializeLeadHandler};
use crate::domain::foundation::{DomainError, EmailAddress, TypeId};
use crate::domain::public::ResultSummary;
use crate::ports::{
    CatalogRepository, Notifier, PublicAssessmentRepository, RecommendationGenerator,
    ResponseRepository, ResultNotice,
};

#[derive(Debug, Clone)]
pub struct DeliverResultCommand {
    pub type_id: Option<TypeId>,
    pub token: String,
    pub email: String,
}

/// Unlike the lead alert, a failed send is reported to the caller. The
/// lead created on the way stays in place either way.
pub struct DeliverResultHandler {
    public: Arc<dyn PublicAssessmentRepository>,
    materialize: Arc<MaterializeLeadHandler>,
    notifier: Arc<dyn Notifier>,
    builder: ResultBuilder,
    public_base_url: Option<String>,
}

impl DeliverResultHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        responses: Arc<dyn ResponseRepository>,
        recommender: Option<Arc<dyn RecommendationGenerator>>,
        materialize: Arc<MaterializeLeadHandler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            public,
            materialize,
            notifier,
            builder: ResultBuilder::new(catalog, responses, recommender),
            public_base_url: None,
        }
    }

    /// Base URL used to put a link back to the result page in the email.
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    pub async fn handle(&self, cmd: DeliverResultCommand) -> Result<ResultSummary, DomainError> {
        // 1. Record where the summary goes
        let recipient = EmailAddress::parse_field("email", &cmd.email)?;
        let assessment = find_by_token(self.public.as_ref(), cmd.type_id, &cmd.token).await?;
        let assessment = self.public.record_email(assessment.id(), &recipient).await?;

        // 2. Same idempotent path as completion
        self.materialize
            .handle(MaterializeLeadCommand {
                public_assessment_id: assessment.id(),
            })
            .await?;

        // 3. Send
        let summary = self.builder.build(&assessment).await?;
        let result_url = self.public_base_url.as_ref().map(|base| {
            format!(
                "{}/public/{}/result/{}",
                base,
                assessment.type_id(),
                assessment.token()
            )
        });
        self.notifier
            .deliver_result(&ResultNotice {
                recipient,
                summary: summary.clone(),
                result_url,
            })
            .await
            .map_err(|error| {
                tracing::warn!(
                    public_assessment_id = %assessment.id(),
                    error = %error,
                    "Result delivery failed"
                );
                DomainError::from(error)
            })?;

        tracing::info!(public_assessment_id = %assessment.id(), "Result summary sent");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::Fixture;
    use crate::domain::foundation::{ErrorCode, ErrorKind, Timestamp};
    use crate::domain::public::{PublicAssessmentDraft, ResultToken};
    use crate::domain::response::{PublicAnswer, PublicResponse};

    async fn open_assessment(fx: &Fixture) -> (TypeId, ResultToken) {
        let (assessment_type, tree) = fx
            .public_type("Cyber", &[("Identity", &[true])], "sales@firm.io")
            .await;
        let token = ResultToken::generate();
        let assessment = fx
            .public()
            .create(PublicAssessmentDraft {
                type_id: assessment_type.id,
                version_id: tree.version.id(),
                token: token.clone(),
                group_tag: None,
                source_ip: None,
                started_at: Timestamp::now(),
            })
            .await
            .unwrap();
        fx.responses()
            .upsert_public_responses(
                assessment.id(),
                &[PublicResponse {
                    public_assessment_id: assessment.id(),
                    question_id: tree.domains[0].questions[0].id,
                    value: PublicAnswer::Yes,
                    answered_at: Timestamp::now(),
                }],
            )
            .await
            .unwrap();
        (assessment_type.id, token)
    }

    fn handler(fx: &Fixture) -> DeliverResultHandler {
        DeliverResultHandler::new(
            fx.catalog(),
            fx.public(),
            fx.responses(),
            None,
            Arc::new(MaterializeLeadHandler::new(
                fx.catalog(),
                fx.public(),
                fx.responses(),
                fx.leads(),
                fx.notifier_port(),
                fx.audit_log(),
            )),
            fx.notifier_port(),
        )
        .with_public_base_url(Some("https://assess.example.com/".into()))
    }

    #[tokio::test]
    async fn delivers_summary_and_creates_lead() {
        let fx = Fixture::new();
        let (type_id, token) = open_assessment(&fx).await;

        let summary = handler(&fx)
            .handle(DeliverResultCommand {
                type_id: Some(type_id),
                token: token.to_string(),
                email: "dana@acme.io".into(),
            })
            .await
            .unwrap();
        assert_eq!(summary.overall, 100.0);

        let sent = fx.notifier.result_notices().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.as_str(), "dana@acme.io");
        assert_eq!(
            sent[0].result_url.as_deref(),
            Some(format!("https://assess.example.com/public/{}/result/{}", type_id, token).as_str())
        );
        assert_eq!(fx.leads().list(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_send_is_reported_but_lead_stays() {
        let fx = Fixture::new();
        let (type_id, token) = open_assessment(&fx).await;
        fx.notifier.set_failing(true);

        let err = handler(&fx)
            .handle(DeliverResultCommand {
                type_id: Some(type_id),
                token: token.to_string(),
                email: "dana@acme.io".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(fx.leads().list(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_or_malformed_token_is_not_found() {
        let fx = Fixture::new();
        let (type_id, _) = open_assessment(&fx).await;
        for token in [ResultToken::generate().to_string(), "nope".to_string()] {
            let err = handler(&fx)
                .handle(DeliverResultCommand {
                    type_id: Some(type_id),
                    token,
                    email: "dana@acme.io".into(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::PublicAssessmentNotFound);
        }
    }
}
