//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

const MIN_TTL_SECS: u64 = 60;
const MAX_TTL_SECS: u64 = 7 * 24 * 3600;

/// Bootstrap administrator and bearer session settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Administrator login (an email address)
    pub admin_email: Option<String>,

    #[serde(default = "default_admin_name")]
    pub admin_display_name: String,

    /// SHA-256 hex of the administrator secret
    pub admin_secret_sha256: Option<Secret<String>>,

    /// Bearer token lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl AuthConfig {
    /// Get session TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Whether a bootstrap administrator is configured
    pub fn has_admin(&self) -> bool {
        self.admin_email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Production needs an administrator; elsewhere the application can run
    /// with respondent logins only.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !(MIN_TTL_SECS..=MAX_TTL_SECS).contains(&self.session_ttl_secs) {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if !self.has_admin() {
            if *environment == Environment::Production {
                return Err(ValidationError::MissingRequired("AUTH__ADMIN_EMAIL"));
            }
            return Ok(());
        }
        let digest = self
            .admin_secret_sha256
            .as_ref()
            .map(|d| d.expose_secret().trim().to_string())
            .ok_or(ValidationError::MissingRequired("AUTH__ADMIN_SECRET_SHA256"))?;
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAdminDigest);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_display_name: default_admin_name(),
            admin_secret_sha256: None,
            session_ttl_secs: default_session_ttl(),
        }
    }
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_session_ttl() -> u64 {
    8 * 3600
}
