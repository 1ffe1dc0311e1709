//! Principal checks shared by the handlers.

use crate::domain::foundation::{DomainError, ErrorCode, Principal, RespondentId};
use crate::domain::project::{Membership, Project};
use crate::ports::ProjectRepository;

pub(crate) fn forbidden(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::Forbidden, message)
}

pub(crate) fn require_admin(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(forbidden("Administrator access required"))
    }
}

pub(crate) fn require_respondent(principal: &Principal) -> Result<RespondentId, DomainError> {
    match principal {
        Principal::Respondent { respondent_id, .. } => Ok(*respondent_id),
        Principal::Admin { .. } => Err(forbidden("Only respondents can answer questionnaires")),
    }
}

/// Admins reach every project; respondents only the ones they actively belong to.
pub(crate) async fn authorize_project(
    projects: &dyn ProjectRepository,
    principal: &Principal,
    project: &Project,
) -> Result<(), DomainError> {
    match principal {
        Principal::Admin { .. } => Ok(()),
        Principal::Respondent {
            respondent_id,
            client_id,
            ..
        } => {
            if *client_id != project.client_id() {
                return Err(forbidden(format!(
                    "Project {} belongs to another client",
                    project.id()
                )));
            }
            let members = projects.members(project.id()).await?;
            Membership::ensure_member(&members, project.id(), *respondent_id)
        }
    }
}
