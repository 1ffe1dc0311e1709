use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, PublicAssessmentId, Timestamp, TypeId,
};
use crate::domain::public::{
    ContactDetails, GroupSelector, PublicAssessment, PublicAssessmentDraft, ResultToken,
};
use crate::ports::PublicAssessmentRepository;

fn not_found(id: PublicAssessmentId) -> DomainError {
    DomainError::not_found(ErrorCode::PublicAssessmentNotFound, "Public assessment", id)
}

fn by_completion(mut assessments: Vec<PublicAssessment>) -> Vec<PublicAssessment> {
    assessments.sort_by_key(|a| (a.completed_at(), a.id()));
    assessments
}

#[async_trait]
impl PublicAssessmentRepository for InMemoryStore {
    async fn create(
        &self,
        draft: PublicAssessmentDraft,
    ) -> Result<PublicAssessment, DomainError> {
        let mut state = self.state.lock().await;
        if state
            .public_assessments
            .values()
            .any(|a| a.token() == &draft.token)
        {
            return Err(DomainError::new(ErrorCode::Conflict, "Result token collision"));
        }
        let id = PublicAssessmentId::new(state.next_id());
        let assessment = PublicAssessment::new(id, draft);
        state.public_assessments.insert(id, assessment.clone());
        Ok(assessment)
    }

    async fn find(&self, id: PublicAssessmentId) -> Result<Option<PublicAssessment>, DomainError> {
        Ok(self.state.lock().await.public_assessments.get(&id).cloned())
    }

    async fn find_by_token(
        &self,
        token: &ResultToken,
    ) -> Result<Option<PublicAssessment>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .public_assessments
            .values()
            .find(|a| a.token() == token)
            .cloned())
    }

    async fn complete(
        &self,
        id: PublicAssessmentId,
        contact: ContactDetails,
        now: Timestamp,
    ) -> Result<(PublicAssessment, bool), DomainError> {
        let mut state = self.state.lock().await;
        let mut assessment = state
            .public_assessments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))?;
        let changed = assessment.complete(contact, now)?;
        if changed {
            state.public_assessments.insert(id, assessment.clone());
        }
        Ok((assessment, changed))
    }

    async fn record_email(
        &self,
        id: PublicAssessmentId,
        email: &EmailAddress,
    ) -> Result<PublicAssessment, DomainError> {
        let mut state = self.state.lock().await;
        let assessment = state
            .public_assessments
            .get_mut(&id)
            .ok_or_else(|| not_found(id))?;
        assessment.record_email(email.clone());
        Ok(assessment.clone())
    }

    async fn list_completed(
        &self,
        type_id: TypeId,
        group: &GroupSelector,
    ) -> Result<Vec<PublicAssessment>, DomainError> {
        let state = self.state.lock().await;
        Ok(by_completion(
            state
                .public_assessments
                .values()
                .filter(|a| a.type_id() == type_id && a.is_completed() && group.includes(a))
                .cloned()
                .collect(),
        ))
    }

    async fn list_all_completed(&self) -> Result<Vec<PublicAssessment>, DomainError> {
        let state = self.state.lock().await;
        Ok(by_completion(
            state
                .public_assessments
                .values()
                .filter(|a| a.is_completed())
                .cloned()
                .collect(),
        ))
    }
}
