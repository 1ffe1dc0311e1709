//! Mapping of domain and auth failures onto HTTP responses.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{AuthError, DomainError, ErrorKind};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }
}

/// Failure of an API call.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Auth(AuthError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NotEditable | ErrorKind::Conflict | ErrorKind::PreconditionFailed => {
            StatusCode::CONFLICT
        }
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(err) => {
                let status = status_for(err.kind());
                if status.is_server_error() {
                    tracing::error!(code = %err.code, error = %err.message, "Request failed");
                }
                let body = ErrorResponse {
                    code: err.code.to_string(),
                    message: err.message,
                    details: err.details,
                };
                (status, Json(body)).into_response()
            }
            ApiError::Auth(err) => {
                let (status, code) = match &err {
                    AuthError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                    AuthError::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
                    AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                    AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                    AuthError::ServiceUnavailable(msg) => {
                        tracing::error!("Auth service unavailable: {}", msg);
                        (StatusCode::SERVICE_UNAVAILABLE, "AUTH_UNAVAILABLE")
                    }
                };
                (status, Json(ErrorResponse::new(code, err.to_string()))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotEditable), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::PreconditionFailed), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Transient), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn locked_assessment_is_conflict() {
        let err = DomainError::new(ErrorCode::LockedAssessment, "Locked");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_lead_is_not_found() {
        let err = DomainError::not_found(ErrorCode::LeadNotFound, "Lead", 4);
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let response = ApiError::from(AuthError::TokenExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
