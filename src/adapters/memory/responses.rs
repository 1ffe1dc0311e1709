use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectAssessmentId, ProjectId, PublicAssessmentId,
};
use crate::domain::response::{
    apply_write, ProjectResponse, PublicResponse, ResponseWrite, WriteOutcome,
};
use crate::ports::ResponseRepository;

#[async_trait]
impl ResponseRepository for InMemoryStore {
    async fn upsert_project_response(
        &self,
        binding_id: ProjectAssessmentId,
        write: &ResponseWrite,
    ) -> Result<WriteOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let binding = state.bindings.get(&binding_id).ok_or_else(|| {
            DomainError::not_found(
                ErrorCode::ProjectAssessmentNotFound,
                "Project assessment",
                binding_id,
            )
        })?;
        if binding.project_id() != write.project_id {
            return Err(DomainError::validation(
                "project_assessment_id",
                "Assessment does not belong to this project",
            ));
        }
        let project = state.projects.get(&write.project_id).ok_or_else(|| {
            DomainError::not_found(ErrorCode::ProjectNotFound, "Project", write.project_id)
        })?;
        project.ensure_active()?;
        binding.ensure_open()?;

        let reachable = state
            .tree(binding.version_id())
            .is_some_and(|tree| tree.contains_active_question(write.question_id));
        if !reachable {
            return Err(DomainError::validation(
                "question_id",
                format!(
                    "Question {} is not part of this assessment",
                    write.question_id
                ),
            ));
        }

        let key = (write.project_id, write.question_id);
        let outcome = apply_write(state.project_responses.get(&key), write);
        match &outcome {
            WriteOutcome::Stored(row) => {
                state.project_responses.insert(key, row.clone());
            }
            WriteOutcome::Deleted => {
                state.project_responses.remove(&key);
            }
            WriteOutcome::Unchanged | WriteOutcome::Superseded(_) => {}
        }
        Ok(outcome)
    }

    async fn list_project_responses(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectResponse>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .project_responses
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn upsert_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
        responses: &[PublicResponse],
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let assessment = state
            .public_assessments
            .get(&public_assessment_id)
            .ok_or_else(|| {
                DomainError::not_found(
                    ErrorCode::PublicAssessmentNotFound,
                    "Public assessment",
                    public_assessment_id,
                )
            })?;
        assessment.ensure_open()?;
        if responses
            .iter()
            .any(|r| r.public_assessment_id != public_assessment_id)
        {
            return Err(DomainError::validation(
                "public_assessment_id",
                "Responses belong to another assessment",
            ));
        }
        for response in responses {
            state.public_responses.insert(
                (public_assessment_id, response.question_id),
                response.clone(),
            );
        }
        Ok(())
    }

    async fn list_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
    ) -> Result<Vec<PublicResponse>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .public_responses
            .values()
            .filter(|r| r.public_assessment_id == public_assessment_id)
            .cloned()
            .collect())
    }
}
