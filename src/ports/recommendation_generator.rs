//! Recommendation generator port.
//!
//! An optional text collaborator that turns a domain score into advice.
//! Callers substitute the deterministic fallback template on any error.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::response::PublicAnswer;
use crate::domain::scoring::MaturityLevel;

/// Input for one domain's recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub type_name: String,
    pub domain_name: String,
    pub score: f64,
    pub maturity: MaturityLevel,
    /// Questions of the domain with the visitor's answers.
    pub answers: Vec<(String, PublicAnswer)>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendationError {
    #[error("recommendation provider unavailable: {0}")]
    Unavailable(String),

    #[error("recommendation provider returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("recommendation request timed out")]
    Timeout,
}

#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<String, RecommendationError>;
}
