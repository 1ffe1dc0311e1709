//! Credential provider port.
//!
//! Verifies a login/secret pair and yields the principal it belongs to.
//! Hashing mechanics stay behind the port.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal};

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown login or a wrong secret
    /// - `AccountDisabled` for a deactivated respondent
    /// - `ServiceUnavailable` if the backing store failed
    async fn verify(&self, login: &str, secret: &str) -> Result<Principal, AuthError>;

    /// Digest stored for a new secret.
    fn digest(&self, secret: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn CredentialProvider) {}
    }
}
