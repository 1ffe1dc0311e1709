//! Credential provider backed by a bootstrap administrator and the
//! respondent table.
//!
//! Secrets are stored as lowercase SHA-256 hex digests. Comparison runs in
//! constant time.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::domain::foundation::{AuthError, EmailAddress, Principal};
use crate::ports::{ClientRepository, CredentialProvider};

/// The administrator configured at deploy time.
#[derive(Clone)]
pub struct AdminAccount {
    pub login: String,
    pub display_name: String,
    /// SHA-256 hex of the administrator secret.
    pub secret_digest: Secret<String>,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("login", &self.login)
            .field("display_name", &self.display_name)
            .field("secret_digest", &"[REDACTED]")
            .finish()
    }
}

/// Verifies the bootstrap administrator first, then respondents.
pub struct StaticCredentialProvider {
    admin: Option<AdminAccount>,
    clients: Arc<dyn ClientRepository>,
}

impl StaticCredentialProvider {
    pub fn new(admin: Option<AdminAccount>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { admin, clients }
    }
}

/// Lowercase hex SHA-256 of `secret`.
pub fn sha256_hex(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn digests_match(stored: &str, candidate: &str) -> bool {
    let stored = stored.trim().to_ascii_lowercase();
    stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn verify(&self, login: &str, secret: &str) -> Result<Principal, AuthError> {
        let login = login.trim();
        let candidate = sha256_hex(secret);

        if let Some(admin) = &self.admin {
            if admin.login.eq_ignore_ascii_case(login) {
                return if digests_match(admin.secret_digest.expose_secret(), &candidate) {
                    Ok(Principal::admin(&admin.login, &admin.display_name))
                } else {
                    Err(AuthError::InvalidCredentials)
                };
            }
        }

        let Ok(email) = EmailAddress::parse(login) else {
            return Err(AuthError::InvalidCredentials);
        };
        let respondent = self
            .clients
            .find_respondent_by_login(&email)
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !digests_match(&respondent.secret_digest, &candidate) {
            return Err(AuthError::InvalidCredentials);
        }
        if !respondent.active {
            return Err(AuthError::AccountDisabled);
        }
        Ok(Principal::Respondent {
            respondent_id: respondent.id,
            client_id: respondent.client_id,
            login: respondent.login.as_str().to_string(),
            display_name: respondent.display_name,
        })
    }

    fn digest(&self, secret: &str) -> String {
        sha256_hex(secret)
    }
}
