//! Catalog repository port.
//!
//! Persists assessment types, versions and the domain/question tree.
//!
//! # Design
//!
//! - **Draft-only edits**: every structural mutation re-reads the owning
//!   version inside the store transaction and rejects non-drafts with
//!   `NotEditable`
//! - **Atomic publish**: archiving the previous published version and
//!   publishing the target happen in one transaction

use async_trait::async_trait;

use crate::domain::catalog::{
    AssessmentType, AssessmentVersion, Domain, DomainFields, Question, QuestionFields, TypeDraft,
    VersionBlueprint, VersionDraft, VersionTree,
};
use crate::domain::foundation::{DomainError, DomainId, QuestionId, Timestamp, TypeId, VersionId};

/// Repository port for the questionnaire catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Types
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a type together with its first draft version, filled from
    /// `blueprint`.
    ///
    /// # Errors
    ///
    /// - `TypeNameTaken` if another type uses the name
    /// - `DatabaseError` on persistence failure
    async fn create_type(
        &self,
        draft: &TypeDraft,
        version: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<(AssessmentType, AssessmentVersion), DomainError>;

    /// Persists the mutable attributes of a type.
    ///
    /// # Errors
    ///
    /// - `TypeNotFound` if the type does not exist
    /// - `TypeNameTaken` if the new name clashes
    async fn update_type(&self, assessment_type: &AssessmentType) -> Result<(), DomainError>;

    async fn find_type(&self, id: TypeId) -> Result<Option<AssessmentType>, DomainError>;

    /// All types ordered by name.
    async fn list_types(&self) -> Result<Vec<AssessmentType>, DomainError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Versions
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a draft version to a type, deep-copying `blueprint`.
    ///
    /// # Errors
    ///
    /// - `TypeNotFound` if the type does not exist
    /// - `VersionLabelTaken` if `(type, label)` already exists
    async fn create_version(
        &self,
        type_id: TypeId,
        draft: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError>;

    async fn find_version(&self, id: VersionId) -> Result<Option<AssessmentVersion>, DomainError>;

    /// Versions of a type, newest first.
    async fn list_versions(&self, type_id: TypeId) -> Result<Vec<AssessmentVersion>, DomainError>;

    /// The single published version of a type, if any.
    async fn find_published(
        &self,
        type_id: TypeId,
    ) -> Result<Option<AssessmentVersion>, DomainError>;

    /// Loads a version with its full domain/question tree.
    async fn load_tree(&self, version_id: VersionId) -> Result<Option<VersionTree>, DomainError>;

    /// Publishes a draft and archives the type's current published version
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// - `VersionNotFound` if the version does not exist
    /// - `PreconditionFailed` if the version is not a draft
    /// - `Conflict` if a concurrent publish won the race
    async fn publish_version(
        &self,
        id: VersionId,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError>;

    /// Updates the release notes of a draft.
    ///
    /// # Errors
    ///
    /// - `NotEditable` if the version is not a draft
    async fn update_version_notes(
        &self,
        id: VersionId,
        notes: Option<String>,
    ) -> Result<AssessmentVersion, DomainError>;

    /// Deletes a draft with everything under it.
    ///
    /// # Errors
    ///
    /// - `NotEditable` if the version is not a draft
    /// - `Conflict` if a project binding references it
    async fn delete_draft(&self, id: VersionId) -> Result<(), DomainError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Structure (drafts only)
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a domain at the end of the version.
    async fn add_domain(
        &self,
        version_id: VersionId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError>;

    async fn update_domain(
        &self,
        id: DomainId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError>;

    /// Removes a domain and its questions.
    async fn delete_domain(&self, id: DomainId) -> Result<(), DomainError>;

    /// Rewrites domain positions; `order` must list every domain of the version.
    async fn reorder_domains(
        &self,
        version_id: VersionId,
        order: &[DomainId],
    ) -> Result<(), DomainError>;

    /// Appends a question at the end of the domain.
    async fn add_question(
        &self,
        domain_id: DomainId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError>;

    async fn update_question(
        &self,
        id: QuestionId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError>;

    async fn delete_question(&self, id: QuestionId) -> Result<(), DomainError>;

    /// Rewrites question positions; `order` must list every question of the domain.
    async fn reorder_questions(
        &self,
        domain_id: DomainId,
        order: &[QuestionId],
    ) -> Result<(), DomainError>;
}
