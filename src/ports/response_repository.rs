//! Response store port - project answers and public answers.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectAssessmentId, ProjectId, PublicAssessmentId};
use crate::domain::response::{ProjectResponse, PublicResponse, ResponseWrite, WriteOutcome};

/// Repository port for answers.
///
/// Implementations must:
/// - Keep `(project, question)` and `(public_assessment, question)` unique
/// - Apply last-write-wins per `(project, question)` without exposing a
///   read-modify-write to callers
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Writes or deletes a project answer through `binding_id`.
    ///
    /// # Errors
    ///
    /// - `ProjectAssessmentNotFound` if the binding does not exist
    /// - `LockedAssessment` if the binding is finalized
    /// - `ProjectInactive` if the project was deactivated
    /// - `ValidationFailed` if the question is not an active question of
    ///   the bound version
    async fn upsert_project_response(
        &self,
        binding_id: ProjectAssessmentId,
        write: &ResponseWrite,
    ) -> Result<WriteOutcome, DomainError>;

    async fn list_project_responses(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectResponse>, DomainError>;

    /// Writes a batch of public answers. All or nothing.
    ///
    /// # Errors
    ///
    /// - `PublicAssessmentNotFound` if the assessment does not exist
    /// - `AssessmentCompleted` once the assessment is completed
    async fn upsert_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
        responses: &[PublicResponse],
    ) -> Result<(), DomainError>;

    async fn list_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
    ) -> Result<Vec<PublicResponse>, DomainError>;
}
