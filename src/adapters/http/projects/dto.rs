//! HTTP DTOs for projects, bindings and collaborative answers.

use serde::{Deserialize, Serialize};

use crate::adapters::http::request::double_option;
use crate::domain::foundation::{ClientId, RespondentId, VersionId};
use crate::domain::project::{Progress, Project, ProjectAssessment};
use crate::domain::response::{ProjectResponse, WriteOutcome};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProjectsParams {
    pub client_id: Option<ClientId>,
}

/// Request to create a project bound to one or more published versions.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub client_id: ClientId,
    pub name: String,
    pub description: Option<String>,
    pub evaluator_name: Option<String>,
    pub evaluator_email: Option<String>,
    pub version_ids: Vec<VersionId>,
}

/// `deactivate: true` closes the project; `report_text: null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub deactivate: bool,
    #[serde(default, deserialize_with = "double_option")]
    pub report_text: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddRespondentRequest {
    pub respondent_id: RespondentId,
}

/// Answer write. `score: null` un-answers the question.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResponseRequest {
    pub score: Option<i32>,
    pub comment: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCreatedResponse {
    pub project: Project,
    pub bindings: Vec<ProjectAssessment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseResponse {
    pub project: Project,
    /// False when the project was already released.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Stored,
    Deleted,
    Unchanged,
    Superseded,
}

/// Result of an answer write with the binding's updated progress.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResponseResponse {
    pub status: WriteStatus,
    /// The stored answer, or the newer one that won over this write.
    pub answer: Option<ProjectResponse>,
    pub progress: Progress,
}

impl RecordResponseResponse {
    pub fn new(outcome: WriteOutcome, progress: Progress) -> Self {
        let (status, answer) = match outcome {
            WriteOutcome::Stored(answer) => (WriteStatus::Stored, Some(answer)),
            WriteOutcome::Deleted => (WriteStatus::Deleted, None),
            WriteOutcome::Unchanged => (WriteStatus::Unchanged, None),
            WriteOutcome::Superseded(current) => (WriteStatus::Superseded, Some(current)),
        };
        Self {
            status,
            answer,
            progress,
        }
    }
}
