//! ProjectStatisticsHandler - 0..5 scores of a completed project.
//!
//! Administrators see statistics as soon as every binding is finalized;
//! respondents additionally need the project released.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::access::authorize_project;
use crate::application::handlers::lookup::{require_project, require_tree};
use crate::domain::foundation::{
    round_to, DomainError, DomainId, Principal, ProjectAssessmentId, ProjectId, Timestamp,
};
use crate::domain::project::Project;
use crate::domain::scoring::{project_overall, score_binding, ProjectMaturity};
use crate::ports::{CatalogRepository, ProjectRepository, ResponseRepository};

#[derive(Debug, Clone)]
pub struct ProjectStatisticsQuery {
    pub project_id: ProjectId,
    pub actor: Principal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainStatistics {
    pub domain_id: DomainId,
    pub name: String,
    pub score: Option<f64>,
    pub answered: usize,
    pub total: usize,
    pub completeness: f64,
    pub maturity: Option<ProjectMaturity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingStatistics {
    pub binding_id: ProjectAssessmentId,
    pub type_name: String,
    pub version_label: String,
    pub overall: Option<f64>,
    pub maturity: Option<ProjectMaturity>,
    pub answered: usize,
    pub total: usize,
    pub completeness: f64,
    pub finalized_at: Option<Timestamp>,
    pub domains: Vec<DomainStatistics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatistics {
    pub project: Project,
    pub overall: Option<f64>,
    pub maturity: Option<ProjectMaturity>,
    pub last_finalized_at: Option<Timestamp>,
    pub bindings: Vec<BindingStatistics>,
}

fn share(answered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(answered as f64 * 100.0 / total as f64, 1)
    }
}

pub struct ProjectStatisticsHandler {
    catalog: Arc<dyn CatalogRepository>,
    projects: Arc<dyn ProjectRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl ProjectStatisticsHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        projects: Arc<dyn ProjectRepository>,
        responses: Arc<dyn ResponseRepository>,
    ) -> Self {
        Self {
            catalog,
            projects,
            responses,
        }
    }

    pub async fn handle(&self, query: ProjectStatisticsQuery) -> Result<ProjectStatistics, DomainError> {
        // 1. Access: complete for everyone, released for the client side
        let project = require_project(self.projects.as_ref(), query.project_id).await?;
        authorize_project(self.projects.as_ref(), &query.actor, &project).await?;
        let bindings = self.projects.bindings(project.id()).await?;
        if !Project::is_complete(&bindings) {
            return Err(DomainError::precondition(format!(
                "Statistics for '{}' are available once every assessment is finalized",
                project.name()
            ))
            .with_detail("project_id", project.id().to_string()));
        }
        if !query.actor.is_admin() {
            project.ensure_released()?;
        }

        // 2. Score every binding against its own version tree
        let responses = self.responses.list_project_responses(project.id()).await?;
        let mut scores = Vec::with_capacity(bindings.len());
        let mut rows = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            let tree = require_tree(self.catalog.as_ref(), binding.version_id()).await?;
            let type_name = self
                .catalog
                .find_type(tree.version.type_id())
                .await?
                .map(|t| t.name)
                .unwrap_or_default();
            let score = score_binding(&tree, &responses);

            rows.push(BindingStatistics {
                binding_id: binding.id(),
                type_name,
                version_label: tree.version.label().to_string(),
                overall: score.overall.map(|v| round_to(v, 2)),
                maturity: score.overall.map(ProjectMaturity::from_score),
                answered: score.answered,
                total: score.total,
                completeness: share(score.answered, score.total),
                finalized_at: binding.finalized_at(),
                domains: score
                    .domains
                    .iter()
                    .map(|d| DomainStatistics {
                        domain_id: d.domain_id,
                        name: d.name.clone(),
                        score: d.mean.map(|v| round_to(v, 2)),
                        answered: d.answered,
                        total: d.total,
                        completeness: round_to(d.completeness(), 1),
                        maturity: d.mean.map(ProjectMaturity::from_score),
                    })
                    .collect(),
            });
            scores.push(score);
        }

        // 3. Project roll-up
        let overall = project_overall(&scores);
        Ok(ProjectStatistics {
            overall: overall.map(|v| round_to(v, 2)),
            maturity: overall.map(ProjectMaturity::from_score),
            last_finalized_at: bindings.iter().filter_map(|b| b.finalized_at()).max(),
            project,
            bindings: rows,
        })
    }
}
