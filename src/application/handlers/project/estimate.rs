//! ProjectEstimateHandler - progress overview of a project and its bindings.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::access::authorize_project;
use crate::application::handlers::lookup::{require_project, require_version};
use crate::domain::foundation::{round_to, DomainError, Principal, ProjectId, RespondentId};
use crate::domain::project::{overall_progress, Progress, Project, ProjectAssessment, ProjectState};
use crate::ports::{CatalogRepository, ClientRepository, ProjectRepository};

#[derive(Debug, Clone)]
pub struct ProjectEstimateQuery {
    pub project_id: ProjectId,
    pub actor: Principal,
}

/// Share of a binding's questions whose current answer a member wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub respondent_id: RespondentId,
    pub display_name: String,
    pub progress: Progress,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingEstimate {
    pub binding: ProjectAssessment,
    pub type_name: String,
    pub version_label: String,
    pub progress: Progress,
    pub percentage: f64,
    pub can_edit: bool,
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectEstimate {
    pub project: Project,
    pub state: ProjectState,
    pub overall_progress: f64,
    pub bindings: Vec<BindingEstimate>,
}

pub struct ProjectEstimateHandler {
    catalog: Arc<dyn CatalogRepository>,
    clients: Arc<dyn ClientRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectEstimateHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        clients: Arc<dyn ClientRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            catalog,
            clients,
            projects,
        }
    }

    pub async fn handle(&self, query: ProjectEstimateQuery) -> Result<ProjectEstimate, DomainError> {
        let project = require_project(self.projects.as_ref(), query.project_id).await?;
        authorize_project(self.projects.as_ref(), &query.actor, &project).await?;

        let bindings = self.projects.bindings(project.id()).await?;
        let members: Vec<_> = self
            .projects
            .members(project.id())
            .await?
            .into_iter()
            .filter(|m| m.active)
            .collect();
        let respondents = self.clients.list_respondents(project.client_id()).await?;

        let mut estimates = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            let version = require_version(self.catalog.as_ref(), binding.version_id()).await?;
            let type_name = self
                .catalog
                .find_type(version.type_id())
                .await?
                .map(|t| t.name)
                .unwrap_or_default();
            let progress = self.projects.progress(binding.id()).await?;

            let mut contributions = Vec::with_capacity(members.len());
            for member in &members {
                let share = self
                    .projects
                    .respondent_progress(binding.id(), member.respondent_id)
                    .await?;
                let display_name = respondents
                    .iter()
                    .find(|r| r.id == member.respondent_id)
                    .map(|r| r.display_name.clone())
                    .unwrap_or_default();
                contributions.push(Contribution {
                    respondent_id: member.respondent_id,
                    display_name,
                    progress: share,
                    percentage: share.display_percentage(),
                });
            }

            estimates.push(BindingEstimate {
                can_edit: project.can_edit(binding),
                binding: binding.clone(),
                type_name,
                version_label: version.label().to_string(),
                percentage: progress.display_percentage(),
                progress,
                contributions,
            });
        }

        let progresses: Vec<Progress> = estimates.iter().map(|e| e.progress).collect();
        Ok(ProjectEstimate {
            state: project.state(&bindings),
            overall_progress: round_to(overall_progress(&progresses), 1),
            project,
            bindings: estimates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, principal_for, Fixture};
    use crate::domain::foundation::{ErrorCode, Timestamp};
    use crate::domain::response::ResponseWrite;

    #[tokio::test]
    async fn overall_is_mean_of_binding_progress() {
        let fx = Fixture::new();
        let (_, a) = fx.published_type("A", &[("D", &[true, false])]).await;
        let (_, b) = fx.published_type("B", &[("D", &[true, true, false, false])]).await;
        let setup = fx
            .project_with_members(&[a.version.id(), b.version.id()], &["x@acme.io", "y@acme.io"])
            .await;
        let write = |question, who: usize| {
            ResponseWrite::new(
                setup.project.id(),
                question,
                setup.respondents[who].id,
                Some(3),
                None,
                Timestamp::now(),
            )
            .unwrap()
        };
        let responses = fx.responses();
        responses
            .upsert_project_response(setup.bindings[0].id(), &write(a.domains[0].questions[0].id, 0))
            .await
            .unwrap();
        responses
            .upsert_project_response(setup.bindings[0].id(), &write(a.domains[0].questions[1].id, 1))
            .await
            .unwrap();
        responses
            .upsert_project_response(setup.bindings[1].id(), &write(b.domains[0].questions[0].id, 1))
            .await
            .unwrap();

        let estimate = ProjectEstimateHandler::new(fx.catalog(), fx.clients(), fx.projects())
            .handle(ProjectEstimateQuery {
                project_id: setup.project.id(),
                actor: admin(),
            })
            .await
            .unwrap();

        assert_eq!(estimate.state, ProjectState::Active);
        assert_eq!(estimate.bindings[0].percentage, 100.0);
        assert_eq!(estimate.bindings[1].percentage, 25.0);
        assert_eq!(estimate.overall_progress, 62.5);
        assert_eq!(estimate.bindings[1].type_name, "B");
        assert_eq!(estimate.bindings[0].version_label, "1.0");

        let shares: Vec<f64> = estimate.bindings[0]
            .contributions
            .iter()
            .map(|c| c.percentage)
            .collect();
        assert_eq!(shares, vec![50.0, 50.0]);
    }

    #[tokio::test]
    async fn respondent_of_another_client_is_forbidden() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("A", &[("D", &[true])]).await;
        let setup = fx.project_with_members(&[tree.version.id()], &["x@acme.io"]).await;
        let (_, strangers) = fx.client_with(&["z@other.io"]).await;

        let err = ProjectEstimateHandler::new(fx.catalog(), fx.clients(), fx.projects())
            .handle(ProjectEstimateQuery {
                project_id: setup.project.id(),
                actor: principal_for(&strangers[0]),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
