//! GroupStatisticsHandler - aggregates over completed public assessments.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::application::handlers::lookup::{require_tree, require_type};
use crate::domain::catalog::LightSubset;
use crate::domain::foundation::{DomainError, Principal, TypeId, VersionId};
use crate::domain::public::{summarize_groups, GroupSelector, GroupSummary, GroupTag};
use crate::domain::scoring::{aggregate, score_public, GroupSample, GroupStatistics};
use crate::ports::{CatalogRepository, PublicAssessmentRepository, ResponseRepository};

#[derive(Debug, Clone)]
pub struct GroupStatisticsQuery {
    pub type_id: TypeId,
    /// Raw tag; blank or absent selects the "General" group.
    pub group: Option<String>,
    pub actor: Principal,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub type_id: TypeId,
    pub type_name: String,
    pub group_tag: Option<GroupTag>,
    pub group_label: String,
    #[serde(flatten)]
    pub statistics: GroupStatistics,
}

pub struct GroupStatisticsHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl GroupStatisticsHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        responses: Arc<dyn ResponseRepository>,
    ) -> Self {
        Self {
            catalog,
            public,
            responses,
        }
    }

    /// Distinct `(type, tag)` pairs plus the implicit "General" row per type.
    pub async fn list_groups(&self, actor: &Principal) -> Result<Vec<GroupSummary>, DomainError> {
        require_admin(actor)?;
        let types = self.catalog.list_types().await?;
        let completed = self.public.list_all_completed().await?;
        Ok(summarize_groups(&types, &completed))
    }

    pub async fn statistics(&self, query: GroupStatisticsQuery) -> Result<GroupReport, DomainError> {
        require_admin(&query.actor)?;
        let assessment_type = require_type(self.catalog.as_ref(), query.type_id).await?;
        let selector = GroupSelector::from_tag(GroupTag::parse(query.group.as_deref())?);
        let assessments = self.public.list_completed(query.type_id, &selector).await?;

        // Each assessment is scored against the version it was taken on.
        let mut subsets: HashMap<VersionId, LightSubset> = HashMap::new();
        let mut samples = Vec::with_capacity(assessments.len());
        for assessment in &assessments {
            if !subsets.contains_key(&assessment.version_id()) {
                let subset = require_tree(self.catalog.as_ref(), assessment.version_id())
                    .await?
                    .light_subset();
                subsets.insert(assessment.version_id(), subset);
            }
            let Some(subset) = subsets.get(&assessment.version_id()) else {
                continue;
            };
            let responses = self.responses.list_public_responses(assessment.id()).await?;
            samples.push(GroupSample {
                scores: score_public(subset, &responses),
                completed_at: assessment.completed_at().unwrap_or(assessment.started_at()),
            });
        }

        Ok(GroupReport {
            type_id: assessment_type.id,
            type_name: assessment_type.name,
            group_label: selector.label().to_string(),
            group_tag: selector.tag().cloned(),
            statistics: aggregate(&samples),
        })
    }
}
