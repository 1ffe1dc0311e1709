//! Load-or-NotFound helpers shared by the handlers.

use crate::domain::catalog::{AssessmentType, AssessmentVersion, VersionTree};
use crate::domain::foundation::{
    DomainError, ErrorCode, LeadId, ProjectAssessmentId, ProjectId, PublicAssessmentId, TypeId,
    VersionId,
};
use crate::domain::lead::Lead;
use crate::domain::project::{Project, ProjectAssessment};
use crate::domain::public::PublicAssessment;
use crate::ports::{
    CatalogRepository, LeadRepository, ProjectRepository, PublicAssessmentRepository,
};

pub(crate) async fn require_type(
    catalog: &dyn CatalogRepository,
    id: TypeId,
) -> Result<AssessmentType, DomainError> {
    catalog
        .find_type(id)
        .await?
        .ok_or_else(|| DomainError::not_found(ErrorCode::TypeNotFound, "Assessment type", id))
}

pub(crate) async fn require_version(
    catalog: &dyn CatalogRepository,
    id: VersionId,
) -> Result<AssessmentVersion, DomainError> {
    catalog
        .find_version(id)
        .await?
        .ok_or_else(|| DomainError::not_found(ErrorCode::VersionNotFound, "Version", id))
}

pub(crate) async fn require_tree(
    catalog: &dyn CatalogRepository,
    id: VersionId,
) -> Result<VersionTree, DomainError> {
    catalog
        .load_tree(id)
        .await?
        .ok_or_else(|| DomainError::not_found(ErrorCode::VersionNotFound, "Version", id))
}

pub(crate) async fn require_project(
    projects: &dyn ProjectRepository,
    id: ProjectId,
) -> Result<Project, DomainError> {
    projects
        .find(id)
        .await?
        .ok_or_else(|| DomainError::not_found(ErrorCode::ProjectNotFound, "Project", id))
}

pub(crate) async fn require_binding(
    projects: &dyn ProjectRepository,
    id: ProjectAssessmentId,
) -> Result<ProjectAssessment, DomainError> {
    projects.find_binding(id).await?.ok_or_else(|| {
        DomainError::not_found(ErrorCode::ProjectAssessmentNotFound, "Project assessment", id)
    })
}

pub(crate) async fn require_public_assessment(
    public: &dyn PublicAssessmentRepository,
    id: PublicAssessmentId,
) -> Result<PublicAssessment, DomainError> {
    public.find(id).await?.ok_or_else(|| {
        DomainError::not_found(ErrorCode::PublicAssessmentNotFound, "Public assessment", id)
    })
}

pub(crate) async fn require_lead(
    leads: &dyn LeadRepository,
    id: LeadId,
) -> Result<Lead, DomainError> {
    leads
        .find(id)
        .await?
        .ok_or_else(|| DomainError::not_found(ErrorCode::LeadNotFound, "Lead", id))
}
