use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::foundation::{DomainError, ErrorCode, LeadId, PublicAssessmentId};
use crate::domain::lead::{Lead, LeadDraft, LeadFilter, LeadHistoryEntry};
use crate::ports::LeadRepository;

fn not_found(id: LeadId) -> DomainError {
    DomainError::not_found(ErrorCode::LeadNotFound, "Lead", id)
}

#[async_trait]
impl LeadRepository for InMemoryStore {
    async fn insert_if_absent(&self, draft: &LeadDraft) -> Result<(Lead, bool), DomainError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .leads
            .values()
            .find(|l| l.public_assessment_id == draft.public_assessment_id)
        {
            return Ok((existing.clone(), false));
        }
        if !state
            .public_assessments
            .contains_key(&draft.public_assessment_id)
        {
            return Err(DomainError::not_found(
                ErrorCode::PublicAssessmentNotFound,
                "Public assessment",
                draft.public_assessment_id,
            ));
        }
        let id = LeadId::new(state.next_id());
        let lead = Lead::new(id, draft.clone());
        state.leads.insert(id, lead.clone());
        state.lead_history.push((id, draft.created_entry()));
        Ok((lead, true))
    }

    async fn find(&self, id: LeadId) -> Result<Option<Lead>, DomainError> {
        Ok(self.state.lock().await.leads.get(&id).cloned())
    }

    async fn find_by_public_assessment(
        &self,
        id: PublicAssessmentId,
    ) -> Result<Option<Lead>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .leads
            .values()
            .find(|l| l.public_assessment_id == id)
            .cloned())
    }

    async fn save(&self, lead: &Lead, entries: &[LeadHistoryEntry]) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if !state.leads.contains_key(&lead.id) {
            return Err(not_found(lead.id));
        }
        state.leads.insert(lead.id, lead.clone());
        state
            .lead_history
            .extend(entries.iter().map(|e| (lead.id, e.clone())));
        Ok(())
    }

    async fn history(&self, id: LeadId) -> Result<Vec<LeadHistoryEntry>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .lead_history
            .iter()
            .filter(|(lead, _)| *lead == id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, DomainError> {
        let mut leads: Vec<Lead> = self
            .state
            .lock()
            .await
            .leads
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(leads)
    }

    async fn delete_cascade(&self, id: LeadId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let lead = state.leads.remove(&id).ok_or_else(|| not_found(id))?;
        let assessment = lead.public_assessment_id;
        state.lead_history.retain(|(lead, _)| *lead != id);
        state
            .public_responses
            .retain(|(owner, _), _| *owner != assessment);
        state.public_assessments.remove(&assessment);
        state
            .intake_sessions
            .retain(|_, s| s.public_assessment_id != assessment);
        Ok(())
    }
}
