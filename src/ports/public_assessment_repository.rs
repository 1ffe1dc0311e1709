//! Public assessment repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress, PublicAssessmentId, Timestamp, TypeId};
use crate::domain::public::{
    ContactDetails, GroupSelector, PublicAssessment, PublicAssessmentDraft, ResultToken,
};

#[async_trait]
pub trait PublicAssessmentRepository: Send + Sync {
    async fn create(&self, draft: PublicAssessmentDraft)
        -> Result<PublicAssessment, DomainError>;

    async fn find(&self, id: PublicAssessmentId) -> Result<Option<PublicAssessment>, DomainError>;

    async fn find_by_token(
        &self,
        token: &ResultToken,
    ) -> Result<Option<PublicAssessment>, DomainError>;

    /// Records contact details and completion under a row lock. The flag is
    /// `false` when the assessment was already completed.
    ///
    /// # Errors
    ///
    /// - `PublicAssessmentNotFound` if the assessment does not exist
    /// - `MissingEmail` if the contact has no email
    async fn complete(
        &self,
        id: PublicAssessmentId,
        contact: ContactDetails,
        now: Timestamp,
    ) -> Result<(PublicAssessment, bool), DomainError>;

    /// Stores the address a result summary goes to.
    async fn record_email(
        &self,
        id: PublicAssessmentId,
        email: &EmailAddress,
    ) -> Result<PublicAssessment, DomainError>;

    /// Completed assessments of a type matching the group, oldest first.
    async fn list_completed(
        &self,
        type_id: TypeId,
        group: &GroupSelector,
    ) -> Result<Vec<PublicAssessment>, DomainError>;

    /// Every completed assessment, for the group listing.
    async fn list_all_completed(&self) -> Result<Vec<PublicAssessment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_assessment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PublicAssessmentRepository) {}
    }
}
