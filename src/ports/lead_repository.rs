//! Lead repository port.
//!
//! # Design
//!
//! - **One lead per public assessment**: enforced by a unique key;
//!   `insert_if_absent` resolves the race by returning the existing lead
//! - **Append-only history**: entries are only ever inserted

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LeadId, PublicAssessmentId};
use crate::domain::lead::{Lead, LeadDraft, LeadFilter, LeadHistoryEntry};

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Inserts the lead and its "created" entry unless a lead already exists
    /// for the public assessment. The flag is `true` when inserted.
    async fn insert_if_absent(&self, draft: &LeadDraft) -> Result<(Lead, bool), DomainError>;

    async fn find(&self, id: LeadId) -> Result<Option<Lead>, DomainError>;

    async fn find_by_public_assessment(
        &self,
        id: PublicAssessmentId,
    ) -> Result<Option<Lead>, DomainError>;

    /// Persists the lead and appends `entries` in one transaction.
    ///
    /// # Errors
    ///
    /// - `LeadNotFound` if the lead does not exist
    async fn save(&self, lead: &Lead, entries: &[LeadHistoryEntry]) -> Result<(), DomainError>;

    /// History in insertion order.
    async fn history(&self, id: LeadId) -> Result<Vec<LeadHistoryEntry>, DomainError>;

    /// Leads matching `filter`, newest first.
    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, DomainError>;

    /// Deletes the lead, its history, its public assessment and that
    /// assessment's responses.
    ///
    /// # Errors
    ///
    /// - `LeadNotFound` if the lead does not exist
    async fn delete_cascade(&self, id: LeadId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LeadRepository) {}
    }
}
