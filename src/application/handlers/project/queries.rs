//! Project read handlers: listings scoped by principal, and members.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::access::{authorize_project, require_admin};
use crate::application::handlers::lookup::require_project;
use crate::domain::client::Respondent;
use crate::domain::foundation::{round_to, ClientId, DomainError, Principal, ProjectId};
use crate::domain::project::{overall_progress, Membership, Project, ProjectState};
use crate::ports::{ClientRepository, ProjectRepository};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    #[serde(flatten)]
    pub project: Project,
    pub state: ProjectState,
    pub assessment_count: usize,
    pub overall_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub membership: Membership,
    pub respondent: Option<Respondent>,
}

pub struct ProjectQueries {
    clients: Arc<dyn ClientRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectQueries {
    pub fn new(clients: Arc<dyn ClientRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { clients, projects }
    }

    /// Admins list every project (optionally one client's); respondents
    /// list the active projects they are members of.
    pub async fn list(
        &self,
        actor: &Principal,
        client_id: Option<ClientId>,
    ) -> Result<Vec<ProjectListing>, DomainError> {
        let projects = match actor {
            Principal::Admin { .. } => self.projects.list(client_id).await?,
            Principal::Respondent { respondent_id, .. } => self
                .projects
                .list_for_respondent(*respondent_id)
                .await?
                .into_iter()
                .filter(Project::is_active)
                .collect(),
        };

        let mut listings = Vec::with_capacity(projects.len());
        for project in projects {
            let bindings = self.projects.bindings(project.id()).await?;
            let mut progresses = Vec::with_capacity(bindings.len());
            for binding in &bindings {
                progresses.push(self.projects.progress(binding.id()).await?);
            }
            listings.push(ProjectListing {
                state: project.state(&bindings),
                assessment_count: bindings.len(),
                overall_progress: round_to(overall_progress(&progresses), 1),
                project,
            });
        }
        Ok(listings)
    }

    pub async fn find(&self, actor: &Principal, project_id: ProjectId) -> Result<Project, DomainError> {
        let project = require_project(self.projects.as_ref(), project_id).await?;
        authorize_project(self.projects.as_ref(), actor, &project).await?;
        Ok(project)
    }

    pub async fn members(
        &self,
        actor: &Principal,
        project_id: ProjectId,
    ) -> Result<Vec<MemberView>, DomainError> {
        require_admin(actor)?;
        let project = require_project(self.projects.as_ref(), project_id).await?;
        let respondents = self.clients.list_respondents(project.client_id()).await?;
        Ok(self
            .projects
            .members(project_id)
            .await?
            .into_iter()
            .map(|membership| MemberView {
                respondent: respondents
                    .iter()
                    .find(|r| r.id == membership.respondent_id)
                    .cloned(),
                membership,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, principal_for, Fixture};

    #[tokio::test]
    async fn respondents_only_see_their_projects() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("X", &[("D", &[true])]).await;
        let mine = fx.project_with_members(&[tree.version.id()], &["a@acme.io"]).await;
        let _theirs = fx.project_with_members(&[tree.version.id()], &["b@other.io"]).await;
        let queries = ProjectQueries::new(fx.clients(), fx.projects());

        let all = queries.list(&admin(), None).await.unwrap();
        assert_eq!(all.len(), 2);

        let visible = queries
            .list(&principal_for(&mine.respondents[0]), None)
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].project.id(), mine.project.id());
        assert_eq!(visible[0].state, ProjectState::Active);
        assert_eq!(visible[0].overall_progress, 0.0);
    }

    #[tokio::test]
    async fn members_carry_respondent_details() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("X", &[("D", &[true])]).await;
        let setup = fx.project_with_members(&[tree.version.id()], &["a@acme.io"]).await;

        let members = ProjectQueries::new(fx.clients(), fx.projects())
            .members(&admin(), setup.project.id())
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].respondent.as_ref().unwrap().display_name, "a");
    }
}
