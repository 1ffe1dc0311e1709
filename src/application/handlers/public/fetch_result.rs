//! FetchResultHandler - the scored summary behind a result token.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_tree, require_type};
use crate::domain::foundation::{DomainError, ErrorCode, TypeId};
use crate::domain::public::{PublicAssessment, ResultSummary, ResultToken};
use crate::domain::scoring::{fallback_recommendation, score_public};
use crate::ports::{
    CatalogRepository, PublicAssessmentRepository, RecommendationGenerator, RecommendationRequest,
    ResponseRepository,
};

fn unknown_token(raw: &str) -> DomainError {
    DomainError::new(ErrorCode::PublicAssessmentNotFound, "No result for this link")
        .with_detail("token", raw.to_string())
}

/// Scores an assessment and asks for one recommendation per domain.
///
/// Any generator failure, or no generator at all, falls back to the fixed
/// template for that domain.
#[derive(Clone)]
pub(crate) struct ResultBuilder {
    catalog: Arc<dyn CatalogRepository>,
    responses: Arc<dyn ResponseRepository>,
    recommender: Option<Arc<dyn RecommendationGenerator>>,
}

impl ResultBuilder {
    pub(crate) fn new(
        catalog: Arc<dyn CatalogRepository>,
        responses: Arc<dyn ResponseRepository>,
        recommender: Option<Arc<dyn RecommendationGenerator>>,
    ) -> Self {
        Self {
            catalog,
            responses,
            recommender,
        }
    }

    pub(crate) async fn build(&self, assessment: &PublicAssessment) -> Result<ResultSummary, DomainError> {
        let assessment_type = require_type(self.catalog.as_ref(), assessment.type_id()).await?;
        let subset = require_tree(self.catalog.as_ref(), assessment.version_id())
            .await?
            .light_subset();
        let responses = self.responses.list_public_responses(assessment.id()).await?;
        let scores = score_public(&subset, &responses);

        let mut recommendations = Vec::with_capacity(scores.domains.len());
        for (domain, score) in subset.domains.iter().zip(&scores.domains) {
            let fallback = || fallback_recommendation(&score.name, score.score);
            let Some(recommender) = &self.recommender else {
                recommendations.push(fallback());
                continue;
            };
            let request = RecommendationRequest {
                type_name: assessment_type.name.clone(),
                domain_name: score.name.clone(),
                score: score.score,
                maturity: score.maturity,
                answers: domain
                    .questions
                    .iter()
                    .filter_map(|q| {
                        responses
                            .iter()
                            .find(|r| r.question_id == q.id)
                            .map(|r| (q.text.clone(), r.value))
                    })
                    .collect(),
            };
            match recommender.recommend(&request).await {
                Ok(text) if !text.trim().is_empty() => recommendations.push(text),
                Ok(_) => recommendations.push(fallback()),
                Err(error) => {
                    tracing::warn!(
                        public_assessment_id = %assessment.id(),
                        domain = %score.name,
                        error = %error,
                        "Recommendation generator failed, using fallback text"
                    );
                    recommendations.push(fallback());
                }
            }
        }

        Ok(ResultSummary::assemble(
            assessment,
            &assessment_type.name,
            assessment_type.cta_text.as_deref(),
            &scores,
            recommendations,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct FetchResultQuery {
    /// Type from the URL; a token of another type is not found.
    pub type_id: Option<TypeId>,
    pub token: String,
}

pub struct FetchResultHandler {
    public: Arc<dyn PublicAssessmentRepository>,
    builder: ResultBuilder,
}

impl FetchResultHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        responses: Arc<dyn ResponseRepository>,
        recommender: Option<Arc<dyn RecommendationGenerator>>,
    ) -> Self {
        Self {
            public,
            builder: ResultBuilder::new(catalog, responses, recommender),
        }
    }

    pub async fn handle(&self, query: FetchResultQuery) -> Result<ResultSummary, DomainError> {
        let assessment = find_by_token(self.public.as_ref(), query.type_id, &query.token).await?;
        self.builder.build(&assessment).await
    }
}

/// Malformed tokens are reported exactly like unknown ones.
pub(crate) async fn find_by_token(
    public: &dyn PublicAssessmentRepository,
    type_id: Option<TypeId>,
    raw: &str,
) -> Result<PublicAssessment, DomainError> {
    let token = ResultToken::parse(raw).map_err(|_| unknown_token(raw))?;
    public
        .find_by_token(&token)
        .await?
        .filter(|a| type_id.map_or(true, |t| a.type_id() == t))
        .ok_or_else(|| unknown_token(raw))
}
