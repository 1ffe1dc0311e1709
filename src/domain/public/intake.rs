//! Intake session - the visitor's position in the stepwise questionnaire.

use serde::Serialize;

use super::SessionHandle;
use crate::domain::catalog::LightSubset;
use crate::domain::foundation::{
    DomainError, DomainId, ErrorCode, PublicAssessmentId, Timestamp, TypeId,
};

/// Where the visitor goes after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "index", rename_all = "snake_case")]
pub enum NextStep {
    Domain(usize),
    Contact,
}

/// Server-side state behind a [`SessionHandle`].
///
/// The domain list is frozen at start so that the step indices stay
/// meaningful for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeSession {
    pub handle: SessionHandle,
    pub type_id: TypeId,
    pub public_assessment_id: PublicAssessmentId,
    pub domain_ids: Vec<DomainId>,
    pub current_index: usize,
    pub created_at: Timestamp,
}

impl IntakeSession {
    pub fn start(
        type_id: TypeId,
        public_assessment_id: PublicAssessmentId,
        subset: &LightSubset,
        now: Timestamp,
    ) -> Self {
        Self {
            handle: SessionHandle::new(),
            type_id,
            public_assessment_id,
            domain_ids: subset.domains.iter().map(|d| d.domain_id).collect(),
            current_index: 0,
            created_at: now,
        }
    }

    pub fn step_count(&self) -> usize {
        self.domain_ids.len()
    }

    /// Domain shown at step `index`.
    pub fn domain_at(&self, index: usize) -> Result<DomainId, DomainError> {
        self.domain_ids.get(index).copied().ok_or_else(|| {
            DomainError::new(
                ErrorCode::DomainNotFound,
                format!("Step {} does not exist (0..{})", index, self.domain_ids.len()),
            )
            .with_detail("index", index.to_string())
        })
    }

    /// Step after `index`: the next domain or the contact form.
    pub fn next_after(&self, index: usize) -> NextStep {
        if index + 1 < self.domain_ids.len() {
            NextStep::Domain(index + 1)
        } else {
            NextStep::Contact
        }
    }

    /// Records that step `index` was submitted.
    pub fn advance(&mut self, index: usize) -> NextStep {
        self.current_index = (index + 1).min(self.domain_ids.len());
        self.next_after(index)
    }

    /// Step to land on when resuming.
    pub fn resume_step(&self) -> NextStep {
        if self.current_index < self.domain_ids.len() {
            NextStep::Domain(self.current_index)
        } else {
            NextStep::Contact
        }
    }

    /// Share of steps before `index`, 0..=100.
    pub fn step_percentage(&self, index: usize) -> f64 {
        if self.domain_ids.is_empty() {
            0.0
        } else {
            index.min(self.domain_ids.len()) as f64 * 100.0 / self.domain_ids.len() as f64
        }
    }
}
