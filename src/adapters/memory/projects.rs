use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::catalog::AssessmentVersion;
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, ProjectAssessmentId, ProjectId, RespondentId, Timestamp,
};
use crate::domain::project::{Membership, Progress, Project, ProjectAssessment, ProjectDraft};
use crate::ports::ProjectRepository;

fn binding_not_found(id: ProjectAssessmentId) -> DomainError {
    DomainError::not_found(ErrorCode::ProjectAssessmentNotFound, "Project assessment", id)
}

fn project_not_found(id: ProjectId) -> DomainError {
    DomainError::not_found(ErrorCode::ProjectNotFound, "Project", id)
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn create(
        &self,
        draft: &ProjectDraft,
        now: Timestamp,
    ) -> Result<(Project, Vec<ProjectAssessment>), DomainError> {
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(&draft.client_id) {
            return Err(DomainError::not_found(
                ErrorCode::ClientNotFound,
                "Client",
                draft.client_id,
            ));
        }
        let versions: Vec<AssessmentVersion> = draft
            .version_ids
            .iter()
            .filter_map(|id| state.versions.get(id).cloned())
            .collect();
        draft.validate_versions(&versions)?;

        let project = Project::new(ProjectId::new(state.next_id()), draft, now);
        let mut bindings = Vec::with_capacity(draft.version_ids.len());
        for version_id in &draft.version_ids {
            let binding = ProjectAssessment::new(
                ProjectAssessmentId::new(state.next_id()),
                project.id(),
                *version_id,
            );
            state.bindings.insert(binding.id(), binding.clone());
            bindings.push(binding);
        }
        state.projects.insert(project.id(), project.clone());
        Ok((project, bindings))
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, DomainError> {
        Ok(self.state.lock().await.projects.get(&id).cloned())
    }

    async fn list(&self, client_id: Option<ClientId>) -> Result<Vec<Project>, DomainError> {
        let mut projects: Vec<Project> = self
            .state
            .lock()
            .await
            .projects
            .values()
            .filter(|p| client_id.map_or(true, |c| p.client_id() == c))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(projects)
    }

    async fn list_for_respondent(
        &self,
        respondent_id: RespondentId,
    ) -> Result<Vec<Project>, DomainError> {
        let state = self.state.lock().await;
        let mut projects: Vec<Project> = state
            .memberships
            .iter()
            .filter(|m| m.respondent_id == respondent_id && m.active)
            .filter_map(|m| state.projects.get(&m.project_id).cloned())
            .collect();
        projects.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(projects)
    }

    async fn update(&self, project: &Project) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if !state.projects.contains_key(&project.id()) {
            return Err(project_not_found(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn bindings(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectAssessment>, DomainError> {
        Ok(self.state.lock().await.project_bindings(project_id))
    }

    async fn find_binding(
        &self,
        id: ProjectAssessmentId,
    ) -> Result<Option<ProjectAssessment>, DomainError> {
        Ok(self.state.lock().await.bindings.get(&id).cloned())
    }

    async fn add_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
        now: Timestamp,
    ) -> Result<Membership, DomainError> {
        let mut state = self.state.lock().await;
        let client_id = state
            .projects
            .get(&project_id)
            .map(Project::client_id)
            .ok_or_else(|| project_not_found(project_id))?;
        let respondent = state.respondents.get(&respondent_id).ok_or_else(|| {
            DomainError::not_found(ErrorCode::RespondentNotFound, "Respondent", respondent_id)
        })?;
        respondent.ensure_belongs_to(client_id)?;

        if let Some(existing) = state
            .memberships
            .iter_mut()
            .find(|m| m.project_id == project_id && m.respondent_id == respondent_id)
        {
            existing.active = true;
            return Ok(existing.clone());
        }
        let membership = Membership {
            project_id,
            respondent_id,
            active: true,
            added_at: now,
        };
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn remove_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.project_id == project_id && m.respondent_id == respondent_id)
            .ok_or_else(|| {
                DomainError::not_found(ErrorCode::RespondentNotFound, "Member", respondent_id)
                    .with_detail("project_id", project_id.to_string())
            })?;
        membership.active = false;
        Ok(())
    }

    async fn members(&self, project_id: ProjectId) -> Result<Vec<Membership>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn progress(&self, binding_id: ProjectAssessmentId) -> Result<Progress, DomainError> {
        let state = self.state.lock().await;
        let binding = state
            .bindings
            .get(&binding_id)
            .ok_or_else(|| binding_not_found(binding_id))?;
        Ok(state.progress(binding, None))
    }

    async fn respondent_progress(
        &self,
        binding_id: ProjectAssessmentId,
        respondent_id: RespondentId,
    ) -> Result<Progress, DomainError> {
        let state = self.state.lock().await;
        let binding = state
            .bindings
            .get(&binding_id)
            .ok_or_else(|| binding_not_found(binding_id))?;
        Ok(state.progress(binding, Some(respondent_id)))
    }

    async fn finalize_binding(
        &self,
        binding_id: ProjectAssessmentId,
        now: Timestamp,
    ) -> Result<ProjectAssessment, DomainError> {
        let mut state = self.state.lock().await;
        let mut binding = state
            .bindings
            .get(&binding_id)
            .cloned()
            .ok_or_else(|| binding_not_found(binding_id))?;
        let mut project = state
            .projects
            .get(&binding.project_id())
            .cloned()
            .ok_or_else(|| project_not_found(binding.project_id()))?;
        project.ensure_active()?;

        let progress = state.progress(&binding, None);
        binding.finalize(progress, now)?;
        state.bindings.insert(binding_id, binding.clone());

        let bindings = state.project_bindings(project.id());
        project.note_finalization(&bindings, now);
        state.projects.insert(project.id(), project);
        Ok(binding)
    }

    async fn release(
        &self,
        project_id: ProjectId,
        now: Timestamp,
    ) -> Result<(Project, bool), DomainError> {
        let mut state = self.state.lock().await;
        let mut project = state
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| project_not_found(project_id))?;
        let bindings = state.project_bindings(project_id);
        let changed = project.release(&bindings, now)?;
        state.projects.insert(project_id, project.clone());
        Ok((project, changed))
    }
}
