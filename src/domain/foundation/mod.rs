//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, value objects and error types that form the
//! vocabulary of the assessment platform.

mod audit;
mod auth;
mod email;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use audit::{ActorKind, AuditRecord};
pub use auth::{AuthError, Principal};
pub use email::{parse_recipient_list, EmailAddress};
pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use ids::{
    ClientId, DomainId, LeadId, ProjectAssessmentId, ProjectId, PublicAssessmentId, QuestionId,
    RespondentId, TypeId, VersionId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

/// Rounds to the given number of decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Trims an optional free-text field, mapping blank input to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required text field, rejecting blank input.
pub fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::empty_field(field))
    } else {
        Ok(trimmed.to_string())
    }
}
