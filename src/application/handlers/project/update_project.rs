//! UpdateProjectHandler - deactivation and the opaque report text.

use std::sync::Arc;

use crate::application::handlers::lookup::require_project;
use crate::domain::foundation::{AuditRecord, DomainError, Principal, ProjectId};
use crate::domain::project::Project;
use crate::ports::{record_quietly, AuditLog, ProjectRepository};

#[derive(Debug, Clone)]
pub struct UpdateProjectCommand {
    pub project_id: ProjectId,
    /// Deactivation is one-way.
    pub deactivate: bool,
    /// `Some(None)` clears the text.
    pub report_text: Option<Option<String>>,
    pub actor: Principal,
}

pub struct UpdateProjectHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLog>,
}

impl UpdateProjectHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { projects, audit }
    }

    pub async fn handle(&self, cmd: UpdateProjectCommand) -> Result<Project, DomainError> {
        let mut project = require_project(self.projects.as_ref(), cmd.project_id).await?;
        let was_active = project.is_active();
        if cmd.deactivate {
            project.deactivate();
        }
        if let Some(text) = cmd.report_text {
            project.set_report_text(text);
        }
        self.projects.update(&project).await?;

        if was_active && !project.is_active() {
            record_quietly(
                self.audit.as_ref(),
                AuditRecord::by(&cmd.actor, "project.deactivated", "project")
                    .entity(project.id(), Some(project.name())),
            )
            .await;
        }
        Ok(project)
    }
}
