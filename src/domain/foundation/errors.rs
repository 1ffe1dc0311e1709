//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' does not accept {actual}, allowed: {allowed}")]
    NotAllowed {
        field: String,
        allowed: String,
        actual: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a validation error for a value outside a closed set.
    pub fn not_allowed(
        field: impl Into<String>,
        allowed: impl Into<String>,
        actual: impl ToString,
    ) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            allowed: allowed.into(),
            actual: actual.to_string(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    MissingEmail,

    // Edit-lock errors
    NotEditable,
    LockedAssessment,
    AssessmentCompleted,
    ProjectInactive,

    // Precondition errors
    PreconditionFailed,
    NoLightQuestions,
    InvalidStateTransition,

    // Not found errors
    TypeNotFound,
    VersionNotFound,
    DomainNotFound,
    QuestionNotFound,
    ClientNotFound,
    RespondentNotFound,
    ProjectNotFound,
    ProjectAssessmentNotFound,
    PublicAssessmentNotFound,
    IntakeSessionNotFound,
    LeadNotFound,

    // Conflict errors
    VersionLabelTaken,
    TypeNameTaken,
    Conflict,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Infrastructure errors
    DatabaseError,
    TransportError,
    AIProviderError,
    InternalError,
}

/// Coarse failure category that callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotEditable,
    PreconditionFailed,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Transient,
    Internal,
}

impl ErrorCode {
    /// Projects the code onto its failure category.
    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            ValidationFailed | MissingEmail => ErrorKind::Validation,
            NotEditable | LockedAssessment | AssessmentCompleted | ProjectInactive => {
                ErrorKind::NotEditable
            }
            PreconditionFailed | NoLightQuestions | InvalidStateTransition => {
                ErrorKind::PreconditionFailed
            }
            TypeNotFound | VersionNotFound | DomainNotFound | QuestionNotFound
            | ClientNotFound | RespondentNotFound | ProjectNotFound
            | ProjectAssessmentNotFound | PublicAssessmentNotFound | IntakeSessionNotFound
            | LeadNotFound => ErrorKind::NotFound,
            VersionLabelTaken | TypeNameTaken | Conflict => ErrorKind::Conflict,
            Unauthorized => ErrorKind::Unauthorized,
            Forbidden => ErrorKind::Forbidden,
            DatabaseError | TransportError | AIProviderError => ErrorKind::Transient,
            InternalError => ErrorKind::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::MissingEmail => "MISSING_EMAIL",
            ErrorCode::NotEditable => "NOT_EDITABLE",
            ErrorCode::LockedAssessment => "LOCKED_ASSESSMENT",
            ErrorCode::AssessmentCompleted => "ASSESSMENT_COMPLETED",
            ErrorCode::ProjectInactive => "PROJECT_INACTIVE",
            ErrorCode::PreconditionFailed => "PRECONDITION_FAILED",
            ErrorCode::NoLightQuestions => "NO_LIGHT_QUESTIONS",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::TypeNotFound => "TYPE_NOT_FOUND",
            ErrorCode::VersionNotFound => "VERSION_NOT_FOUND",
            ErrorCode::DomainNotFound => "DOMAIN_NOT_FOUND",
            ErrorCode::QuestionNotFound => "QUESTION_NOT_FOUND",
            ErrorCode::ClientNotFound => "CLIENT_NOT_FOUND",
            ErrorCode::RespondentNotFound => "RESPONDENT_NOT_FOUND",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::ProjectAssessmentNotFound => "PROJECT_ASSESSMENT_NOT_FOUND",
            ErrorCode::PublicAssessmentNotFound => "PUBLIC_ASSESSMENT_NOT_FOUND",
            ErrorCode::IntakeSessionNotFound => "INTAKE_SESSION_NOT_FOUND",
            ErrorCode::LeadNotFound => "LEAD_NOT_FOUND",
            ErrorCode::VersionLabelTaken => "VERSION_LABEL_TAKEN",
            ErrorCode::TypeNameTaken => "TYPE_NAME_TAKEN",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
            ErrorCode::AIProviderError => "AI_PROVIDER_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a not-found error for the given code and identifier.
    pub fn not_found(code: ErrorCode, entity: &str, id: impl fmt::Display) -> Self {
        Self::new(code, format!("{} not found: {}", entity, id)).with_detail("id", id.to_string())
    }

    /// Creates a precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PreconditionFailed, message)
    }

    /// Creates a database failure, wrapping the underlying cause.
    pub fn database(context: &str, cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", context, cause))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("name");
        assert_eq!(format!("{}", err), "Field 'name' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("score", 0, 5, 7);
        assert_eq!(format!("{}", err), "Field 'score' must be between 0 and 5, got 7");
    }

    #[test]
    fn validation_error_not_allowed_displays_correctly() {
        let err = ValidationError::not_allowed("value", "0, 3, 5", 4);
        assert_eq!(
            format!("{}", err),
            "Field 'value' does not accept 4, allowed: 0, 3, 5"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::LeadNotFound, "Lead not found");
        assert_eq!(format!("{}", err), "[LEAD_NOT_FOUND] Lead not found");
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("email").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"email".to_string()));
    }

    #[test]
    fn codes_project_onto_kinds() {
        assert_eq!(ErrorCode::LockedAssessment.kind(), ErrorKind::NotEditable);
        assert_eq!(ErrorCode::NoLightQuestions.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(ErrorCode::MissingEmail.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::VersionLabelTaken.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::DatabaseError.kind(), ErrorKind::Transient);
    }

    #[test]
    fn not_found_carries_identifier() {
        let err = DomainError::not_found(ErrorCode::ProjectNotFound, "Project", 12);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.details.get("id"), Some(&"12".to_string()));
    }
}
