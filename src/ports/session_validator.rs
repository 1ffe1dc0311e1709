//! Session ports - bearer token validation and issuance.
//!
//! HTTP middleware uses [`SessionValidator`] to turn a Bearer token into a
//! [`Principal`]; the login handler uses [`SessionIssuer`] to mint one.
//!
//! # Contract
//!
//! Implementations must:
//! - Return `AuthError::InvalidToken` for unknown or revoked tokens
//! - Return `AuthError::TokenExpired` once the token outlived its TTL
//! - Return `AuthError::ServiceUnavailable` for transient errors

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal};

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validates a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}

#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Issues an opaque token for `principal`.
    async fn issue(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Revokes a token. Unknown tokens are ignored.
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;
}
