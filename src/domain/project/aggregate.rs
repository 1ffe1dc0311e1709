//! Project aggregate - collaborative assessment engagement for one client.

use serde::Serialize;
use std::fmt;

use super::ProjectAssessment;
use crate::domain::catalog::AssessmentVersion;
use crate::domain::foundation::{
    non_blank, required_text, ClientId, DomainError, EmailAddress, ErrorCode, ProjectId,
    RespondentId, Timestamp, ValidationError, VersionId,
};

/// Validated input for a new project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub client_id: ClientId,
    pub name: String,
    pub description: Option<String>,
    pub evaluator_name: Option<String>,
    pub evaluator_email: Option<EmailAddress>,
    pub version_ids: Vec<VersionId>,
}

impl ProjectDraft {
    pub fn new(
        client_id: ClientId,
        name: &str,
        description: Option<String>,
        evaluator_name: Option<String>,
        evaluator_email: Option<String>,
        version_ids: Vec<VersionId>,
    ) -> Result<Self, ValidationError> {
        let evaluator_email = non_blank(evaluator_email)
            .map(|raw| EmailAddress::parse_field("evaluator_email", &raw))
            .transpose()?;
        if version_ids.is_empty() {
            return Err(ValidationError::empty_field("version_ids"));
        }
        let mut unique = Vec::with_capacity(version_ids.len());
        for id in version_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(Self {
            client_id,
            name: required_text("name", name)?,
            description: non_blank(description),
            evaluator_name: non_blank(evaluator_name),
            evaluator_email,
            version_ids: unique,
        })
    }

    /// Every referenced version must be published right now.
    pub fn validate_versions(&self, versions: &[AssessmentVersion]) -> Result<(), DomainError> {
        for id in &self.version_ids {
            let version = versions.iter().find(|v| v.id() == *id).ok_or_else(|| {
                DomainError::not_found(ErrorCode::VersionNotFound, "Version", id)
            })?;
            if !version.is_published() {
                return Err(DomainError::precondition(format!(
                    "Version {} is {}; projects can only bind published versions",
                    version.label(),
                    version.status()
                ))
                .with_detail("version_id", id.to_string()));
            }
        }
        Ok(())
    }
}

/// Derived project lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Active,
    Completable,
    Released,
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectState::Active => "active",
            ProjectState::Completable => "completable",
            ProjectState::Released => "released",
        };
        f.write_str(s)
    }
}

/// An assessment engagement binding a client to published versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    id: ProjectId,
    client_id: ClientId,
    name: String,
    description: Option<String>,
    evaluator_name: Option<String>,
    evaluator_email: Option<EmailAddress>,
    report_text: Option<String>,
    active: bool,
    released: bool,
    created_at: Timestamp,
    finalized_at: Option<Timestamp>,
    released_at: Option<Timestamp>,
}

impl Project {
    pub fn new(id: ProjectId, draft: &ProjectDraft, now: Timestamp) -> Self {
        Self {
            id,
            client_id: draft.client_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            evaluator_name: draft.evaluator_name.clone(),
            evaluator_email: draft.evaluator_email.clone(),
            report_text: None,
            active: true,
            released: false,
            created_at: now,
            finalized_at: None,
            released_at: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ProjectId,
        client_id: ClientId,
        name: String,
        description: Option<String>,
        evaluator_name: Option<String>,
        evaluator_email: Option<EmailAddress>,
        report_text: Option<String>,
        active: bool,
        created_at: Timestamp,
        finalized_at: Option<Timestamp>,
        released_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            client_id,
            name,
            description,
            evaluator_name,
            evaluator_email,
            report_text,
            active,
            released: released_at.is_some(),
            created_at,
            finalized_at,
            released_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn evaluator_name(&self) -> Option<&str> {
        self.evaluator_name.as_deref()
    }

    pub fn evaluator_email(&self) -> Option<&EmailAddress> {
        self.evaluator_email.as_ref()
    }

    pub fn report_text(&self) -> Option<&str> {
        self.report_text.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn finalized_at(&self) -> Option<Timestamp> {
        self.finalized_at
    }

    pub fn released_at(&self) -> Option<Timestamp> {
        self.released_at
    }

    pub fn state(&self, bindings: &[ProjectAssessment]) -> ProjectState {
        if self.released {
            ProjectState::Released
        } else if Self::is_complete(bindings) {
            ProjectState::Completable
        } else {
            ProjectState::Active
        }
    }

    /// True iff every bound assessment is finalized.
    pub fn is_complete(bindings: &[ProjectAssessment]) -> bool {
        !bindings.is_empty() && bindings.iter().all(ProjectAssessment::is_finalized)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails once the project has been deactivated.
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.active {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::ProjectInactive,
                format!("Project '{}' is inactive", self.name),
            )
            .with_detail("project_id", self.id.to_string()))
        }
    }

    /// Guards client-facing reads.
    pub fn ensure_released(&self) -> Result<(), DomainError> {
        if self.released {
            Ok(())
        } else {
            Err(DomainError::precondition(format!(
                "Project '{}' has not been released to the client",
                self.name
            ))
            .with_detail("project_id", self.id.to_string()))
        }
    }

    /// Answering is allowed while the project is active and the binding open.
    pub fn can_edit(&self, binding: &ProjectAssessment) -> bool {
        self.active && !binding.is_finalized()
    }

    /// Records the completion time once the last binding is finalized.
    pub fn note_finalization(&mut self, bindings: &[ProjectAssessment], now: Timestamp) {
        if self.finalized_at.is_none() && Self::is_complete(bindings) {
            self.finalized_at = Some(now);
        }
    }

    /// Makes results visible to the client. Returns `false` if already released.
    pub fn release(
        &mut self,
        bindings: &[ProjectAssessment],
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        if !Self::is_complete(bindings) {
            let pending = bindings.iter().filter(|b| !b.is_finalized()).count();
            return Err(DomainError::precondition(format!(
                "Project cannot be released: {} assessment(s) not finalized",
                pending
            ))
            .with_detail("project_id", self.id.to_string()));
        }
        if self.released {
            return Ok(false);
        }
        self.note_finalization(bindings, now);
        self.released = true;
        self.released_at = Some(now);
        Ok(true)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_report_text(&mut self, text: Option<String>) {
        self.report_text = non_blank(text);
    }
}

/// Membership of a respondent in a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Membership {
    pub project_id: ProjectId,
    pub respondent_id: RespondentId,
    pub active: bool,
    pub added_at: Timestamp,
}

impl Membership {
    /// Fails unless `respondent` is an active member.
    pub fn ensure_member(
        memberships: &[Membership],
        project: ProjectId,
        respondent: RespondentId,
    ) -> Result<(), DomainError> {
        if memberships
            .iter()
            .any(|m| m.project_id == project && m.respondent_id == respondent && m.active)
        {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Respondent {} is not a member of project {}", respondent, project),
            ))
        }
    }
}
