//! ProjectAssessment - binding of a project to one questionnaire version.

use serde::Serialize;

use super::Progress;
use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectAssessmentId, ProjectId, Timestamp, VersionId,
};

/// Binding of a project to one version. Finalization freezes writes.
///
/// The bound version reference never changes, even after that version is
/// archived by a newer publication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAssessment {
    id: ProjectAssessmentId,
    project_id: ProjectId,
    version_id: VersionId,
    finalized: bool,
    finalized_at: Option<Timestamp>,
}

impl ProjectAssessment {
    pub fn new(id: ProjectAssessmentId, project_id: ProjectId, version_id: VersionId) -> Self {
        Self {
            id,
            project_id,
            version_id,
            finalized: false,
            finalized_at: None,
        }
    }

    pub fn reconstitute(
        id: ProjectAssessmentId,
        project_id: ProjectId,
        version_id: VersionId,
        finalized_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            project_id,
            version_id,
            finalized: finalized_at.is_some(),
            finalized_at,
        }
    }

    pub fn id(&self) -> ProjectAssessmentId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn version_id(&self) -> VersionId {
        self.version_id
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn finalized_at(&self) -> Option<Timestamp> {
        self.finalized_at
    }

    /// Fails with `LockedAssessment` once the binding is finalized.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.finalized {
            Err(DomainError::new(
                ErrorCode::LockedAssessment,
                "This assessment has been finalized and no longer accepts answers",
            )
            .with_detail("project_assessment_id", self.id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Finalizes the binding. `progress` must be read inside the same
    /// transaction that persists the result.
    pub fn finalize(&mut self, progress: Progress, now: Timestamp) -> Result<(), DomainError> {
        if self.finalized {
            return Err(DomainError::precondition("Assessment is already finalized")
                .with_detail("project_assessment_id", self.id.to_string()));
        }
        if !progress.is_complete() {
            return Err(DomainError::precondition(format!(
                "All questions must be answered before finalizing ({} of {})",
                progress.answered, progress.total
            ))
            .with_detail("answered", progress.answered.to_string())
            .with_detail("total", progress.total.to_string()));
        }
        self.finalized = true;
        self.finalized_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;

    fn binding() -> ProjectAssessment {
        ProjectAssessment::new(ProjectAssessmentId::new(1), ProjectId::new(1), VersionId::new(1))
    }

    #[test]
    fn finalize_requires_full_progress() {
        let mut b = binding();
        let err = b.finalize(Progress::new(1, 2), Timestamp::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert!(!b.is_finalized());
    }

    #[test]
    fn finalize_succeeds_exactly_once() {
        let mut b = binding();
        b.finalize(Progress::new(2, 2), Timestamp::now()).unwrap();
        assert!(b.is_finalized());
        assert!(b.finalized_at().is_some());

        let err = b.finalize(Progress::new(2, 2), Timestamp::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    }

    #[test]
    fn finalized_binding_is_locked() {
        let mut b = binding();
        assert!(b.ensure_open().is_ok());
        b.finalize(Progress::new(1, 1), Timestamp::now()).unwrap();
        assert_eq!(b.ensure_open().unwrap_err().code, ErrorCode::LockedAssessment);
    }
}
