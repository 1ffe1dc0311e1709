//! Authentication types for the domain layer.
//!
//! A request is made either by a platform administrator or by a respondent
//! acting on behalf of one client. The two are modelled as variants of a
//! single tagged [`Principal`] so that routes dispatch on the variant rather
//! than on runtime type checks.

use serde::Serialize;
use thiserror::Error;

use super::{ClientId, RespondentId};

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    Admin {
        login: String,
        display_name: String,
    },
    Respondent {
        respondent_id: RespondentId,
        client_id: ClientId,
        login: String,
        display_name: String,
    },
}

impl Principal {
    /// Creates an administrator principal.
    pub fn admin(login: impl Into<String>, display_name: impl Into<String>) -> Self {
        Principal::Admin {
            login: login.into(),
            display_name: display_name.into(),
        }
    }

    /// Login name used to authenticate.
    pub fn login(&self) -> &str {
        match self {
            Principal::Admin { login, .. } | Principal::Respondent { login, .. } => login,
        }
    }

    /// Name shown in histories and audit records.
    pub fn display_name(&self) -> &str {
        match self {
            Principal::Admin { display_name, .. }
            | Principal::Respondent { display_name, .. } => display_name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin { .. })
    }

    /// Client the principal acts for, if it is a respondent.
    pub fn client_id(&self) -> Option<ClientId> {
        match self {
            Principal::Respondent { client_id, .. } => Some(*client_id),
            Principal::Admin { .. } => None,
        }
    }
}

/// Authentication errors that can occur during login or token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login name unknown or secret mismatch.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("Account disabled")]
    AccountDisabled,

    /// The token is missing, malformed, or unknown.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token was issued but its lifetime has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The credential backend could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the caller should log in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
