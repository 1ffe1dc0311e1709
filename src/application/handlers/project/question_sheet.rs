//! QuestionSheetHandler - the answer screen of one project binding.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::access::authorize_project;
use crate::application::handlers::lookup::{require_binding, require_project, require_tree};
use crate::domain::catalog::Question;
use crate::domain::foundation::{DomainError, DomainId, Principal, ProjectAssessmentId};
use crate::domain::project::{Progress, ProjectAssessment};
use crate::domain::response::ProjectResponse;
use crate::ports::{CatalogRepository, ProjectRepository, ResponseRepository};

#[derive(Debug, Clone)]
pub struct QuestionSheetQuery {
    pub binding_id: ProjectAssessmentId,
    pub actor: Principal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// Current collaborative answer, if any.
    pub answer: Option<ProjectResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetDomain {
    pub domain_id: DomainId,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<SheetQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSheet {
    pub binding: ProjectAssessment,
    pub project_name: String,
    pub version_label: String,
    pub can_edit: bool,
    pub progress: Progress,
    pub percentage: f64,
    pub domains: Vec<SheetDomain>,
}

pub struct QuestionSheetHandler {
    catalog: Arc<dyn CatalogRepository>,
    projects: Arc<dyn ProjectRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl QuestionSheetHandler {
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

    pub async fn handle(&self, query: QuestionSheetQuery) -> Result<QuestionSheet, DomainError> {
        let binding = require_binding(self.projects.as_ref(), query.binding_id).await?;
        let project = require_project(self.projects.as_ref(), binding.project_id()).await?;
        authorize_project(self.projects.as_ref(), &query.actor, &project).await?;

        let tree = require_tree(self.catalog.as_ref(), binding.version_id()).await?;
        let mut answers: HashMap<_, _> = self
            .responses
            .list_project_responses(project.id())
            .await?
            .into_iter()
            .map(|r| (r.question_id, r))
            .collect();

        let domains = tree
            .active_domains()
            .map(|node| SheetDomain {
                domain_id: node.domain.id,
                name: node.domain.name.clone(),
                description: node.domain.description.clone(),
                questions: node
                    .active_questions()
                    .map(|q| SheetQuestion {
                        question: q.clone(),
                        answer: answers.remove(&q.id),
                    })
                    .collect(),
            })
            .collect();

        let progress = self.projects.progress(binding.id()).await?;
        Ok(QuestionSheet {
            can_edit: project.can_edit(&binding),
            project_name: project.name().to_string(),
            version_label: tree.version.label().to_string(),
            percentage: progress.display_percentage(),
            progress,
            binding,
            domains,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{principal_for, Fixture};
    use crate::domain::foundation::Timestamp;
    use crate::domain::response::ResponseWrite;

    #[tokio::test]
    async fn sheet_shows_current_answers_and_lock_state() {
        let fx = Fixture::new();
        let (_, tree) = fx.published_type("X", &[("D", &[true, false]), ("E", &[false])]).await;
        let setup = fx.project_with_members(&[tree.version.id()], &["a@acme.io"]).await;
        let q1 = tree.domains[0].questions[0].id;
        let write = ResponseWrite::new(
            setup.project.id(),
            q1,
            setup.respondents[0].id,
            Some(4),
            Some("Documented".into()),
            Timestamp::now(),
        )
        .unwrap();
        fx.responses()
            .upsert_project_response(setup.bindings[0].id(), &write)
            .await
            .unwrap();

        let sheet = QuestionSheetHandler::new(fx.catalog(), fx.projects(), fx.responses())
            .handle(QuestionSheetQuery {
                binding_id: setup.bindings[0].id(),
                actor: principal_for(&setup.respondents[0]),
            })
            .await
            .unwrap();

        assert!(sheet.can_edit);
        assert_eq!(sheet.domains.len(), 2);
        let first = &sheet.domains[0].questions[0];
        assert_eq!(first.answer.as_ref().map(|a| a.score.value()), Some(4));
        assert!(sheet.domains[0].questions[1].answer.is_none());
        assert_eq!(sheet.progress, Progress::new(1, 3));
    }
}
