//! Project repository port.
//!
//! Persists projects, their version bindings and memberships, and answers
//! the progress queries the finalization gate depends on.
//!
//! # Design
//!
//! - **Transactional gates**: `finalize_binding` and `release` re-read their
//!   predicates (progress, all-finalized) under row locks in the same
//!   transaction that writes the flag
//! - **Stable bindings**: a binding keeps pointing at its version even after
//!   that version is archived

use async_trait::async_trait;

use crate::domain::foundation::{
    ClientId, DomainError, ProjectAssessmentId, ProjectId, RespondentId, Timestamp,
};
use crate::domain::project::{Membership, Progress, Project, ProjectAssessment, ProjectDraft};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Creates the project and one binding per version.
    ///
    /// # Errors
    ///
    /// - `ClientNotFound` if the client does not exist
    /// - `VersionNotFound` / `PreconditionFailed` if a version is missing or
    ///   not published at the moment of creation
    async fn create(
        &self,
        draft: &ProjectDraft,
        now: Timestamp,
    ) -> Result<(Project, Vec<ProjectAssessment>), DomainError>;

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, DomainError>;

    /// Projects, newest first, optionally for one client.
    async fn list(&self, client_id: Option<ClientId>) -> Result<Vec<Project>, DomainError>;

    /// Projects where the respondent holds an active membership.
    async fn list_for_respondent(
        &self,
        respondent_id: RespondentId,
    ) -> Result<Vec<Project>, DomainError>;

    /// Persists the active flag and report text.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project does not exist
    async fn update(&self, project: &Project) -> Result<(), DomainError>;

    async fn bindings(&self, project_id: ProjectId)
        -> Result<Vec<ProjectAssessment>, DomainError>;

    async fn find_binding(
        &self,
        id: ProjectAssessmentId,
    ) -> Result<Option<ProjectAssessment>, DomainError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds or re-activates a membership. Idempotent.
    async fn add_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
        now: Timestamp,
    ) -> Result<Membership, DomainError>;

    /// Deactivates a membership.
    ///
    /// # Errors
    ///
    /// - `RespondentNotFound` if there is no such membership
    async fn remove_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
    ) -> Result<(), DomainError>;

    async fn members(&self, project_id: ProjectId) -> Result<Vec<Membership>, DomainError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Progress and gates
    // ─────────────────────────────────────────────────────────────────────────

    /// Distinct active questions of the bound version answered in the project.
    async fn progress(&self, binding_id: ProjectAssessmentId) -> Result<Progress, DomainError>;

    /// Like [`progress`](Self::progress) but counting only answers whose
    /// current author is `respondent_id`.
    async fn respondent_progress(
        &self,
        binding_id: ProjectAssessmentId,
        respondent_id: RespondentId,
    ) -> Result<Progress, DomainError>;

    /// Finalizes a binding once progress is 100%.
    ///
    /// # Errors
    ///
    /// - `ProjectAssessmentNotFound` if the binding does not exist
    /// - `PreconditionFailed` if already finalized or progress < 100%
    async fn finalize_binding(
        &self,
        binding_id: ProjectAssessmentId,
        now: Timestamp,
    ) -> Result<ProjectAssessment, DomainError>;

    /// Sets the released flag. Returns the project and whether this call
    /// changed it.
    ///
    /// # Errors
    ///
    /// - `PreconditionFailed` unless every binding is finalized
    async fn release(
        &self,
        project_id: ProjectId,
        now: Timestamp,
    ) -> Result<(Project, bool), DomainError>;
}
