//! Questionnaire versions and their lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    non_blank, required_text, DomainError, ErrorCode, StateMachine, Timestamp, TypeId,
    ValidationError, VersionId,
};

/// Label given to the first draft of every new type.
pub const INITIAL_VERSION_LABEL: &str = "1.0";

/// Lifecycle state of a questionnaire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(VersionStatus::Draft),
            "published" => Ok(VersionStatus::Published),
            "archived" => Ok(VersionStatus::Archived),
            other => Err(ValidationError::not_allowed(
                "status",
                "draft, published, archived",
                other,
            )),
        }
    }
}

impl StateMachine for VersionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use VersionStatus::*;
        matches!((self, target), (Draft, Published) | (Published, Archived))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use VersionStatus::*;
        match self {
            Draft => vec![Published],
            Published => vec![Archived],
            Archived => vec![],
        }
    }
}

/// Validated input for a new version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDraft {
    pub label: String,
    pub notes: Option<String>,
    pub author: Option<String>,
}

impl VersionDraft {
    pub fn new(
        label: &str,
        notes: Option<String>,
        author: Option<String>,
    ) -> Result<Self, ValidationError> {
        let label = required_text("label", label)?;
        if label.len() > 20 {
            return Err(ValidationError::invalid_format(
                "label",
                "must be at most 20 characters",
            ));
        }
        Ok(Self {
            label,
            notes: non_blank(notes),
            author: non_blank(author),
        })
    }

    /// The empty draft every new type starts with.
    pub fn initial(author: Option<String>) -> Self {
        Self {
            label: INITIAL_VERSION_LABEL.to_string(),
            notes: None,
            author,
        }
    }
}

/// A concrete questionnaire snapshot belonging to one type.
///
/// Only drafts are editable. At most one version per type is published;
/// publishing a draft archives the previously published version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentVersion {
    id: VersionId,
    type_id: TypeId,
    label: String,
    status: VersionStatus,
    notes: Option<String>,
    author: Option<String>,
    created_at: Timestamp,
    published_at: Option<Timestamp>,
    archived_at: Option<Timestamp>,
}

impl AssessmentVersion {
    /// Creates a fresh draft from validated input and a store-assigned id.
    pub fn new_draft(id: VersionId, type_id: TypeId, draft: VersionDraft, now: Timestamp) -> Self {
        Self {
            id,
            type_id,
            label: draft.label,
            status: VersionStatus::Draft,
            notes: draft.notes,
            author: draft.author,
            created_at: now,
            published_at: None,
            archived_at: None,
        }
    }

    /// Reconstitutes a version from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: VersionId,
        type_id: TypeId,
        label: String,
        status: VersionStatus,
        notes: Option<String>,
        author: Option<String>,
        created_at: Timestamp,
        published_at: Option<Timestamp>,
        archived_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            type_id,
            label,
            status,
            notes,
            author,
            created_at,
            published_at,
            archived_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> VersionId {
        self.id
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn status(&self) -> VersionStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn published_at(&self) -> Option<Timestamp> {
        self.published_at
    }

    pub fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    pub fn is_draft(&self) -> bool {
        self.status == VersionStatus::Draft
    }

    pub fn is_published(&self) -> bool {
        self.status == VersionStatus::Published
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Rejects any edit unless the version is still a draft.
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.is_draft() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::NotEditable,
                format!(
                    "Version {} is {} and can no longer be edited",
                    self.label, self.status
                ),
            )
            .with_detail("version_id", self.id.to_string())
            .with_detail("status", self.status.as_str()))
        }
    }

    /// Moves a draft to published.
    pub fn publish(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.is_draft() {
            return Err(DomainError::precondition(format!(
                "Only drafts can be published; version {} is {}",
                self.label, self.status
            ))
            .with_detail("version_id", self.id.to_string()));
        }
        self.status = self.status.transition_to(VersionStatus::Published)?;
        self.published_at = Some(now);
        Ok(())
    }

    /// Retires a published version when its successor goes live.
    pub fn archive(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(VersionStatus::Archived)?;
        self.archived_at = Some(now);
        Ok(())
    }

    /// Changes the release notes of a draft.
    pub fn set_notes(&mut self, notes: Option<String>) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.notes = non_blank(notes);
        Ok(())
    }
}

/// Publishes `target`, archiving `current` if one exists.
///
/// Both versions must belong to the same type. Callers persist the two
/// results in one transaction.
pub fn publish_replacing(
    target: &mut AssessmentVersion,
    current: Option<&mut AssessmentVersion>,
    now: Timestamp,
) -> Result<(), DomainError> {
    target.publish(now)?;
    if let Some(current) = current {
        if current.type_id != target.type_id {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Published version belongs to another type",
            ));
        }
        if current.id != target.id {
            current.archive(now)?;
        }
    }
    Ok(())
}
