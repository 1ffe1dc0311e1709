//! Email configuration (SMTP, basic or OAuth2 authentication)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// SMTP authentication scheme
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpAuthType {
    #[default]
    Basic,
    OAuth2,
}

/// Email configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Send mail at all; disabled deployments log notices instead
    #[serde(default)]
    pub enabled: bool,

    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// STARTTLS on the submission port; `false` means implicit TLS
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    #[serde(default)]
    pub auth_type: SmtpAuthType,

    pub username: Option<String>,
    pub password: Option<Secret<String>>,

    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    pub refresh_token: Option<Secret<String>>,

    /// Token endpoint; defaults to the Microsoft identity platform for the tenant
    pub token_url: Option<String>,

    #[serde(default = "default_scope")]
    pub scope: String,

    /// Capacity of the outgoing notification queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn present_secret(value: &Option<Secret<String>>) -> bool {
    value
        .as_ref()
        .is_some_and(|v| !v.expose_secret().trim().is_empty())
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Token endpoint used for the OAuth2 refresh exchange
    pub fn token_url(&self) -> String {
        match &self.token_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                self.tenant_id.as_deref().unwrap_or("common")
            ),
        }
    }

    /// Validate email configuration
    ///
    /// Nothing is checked while sending is disabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if !present(&self.smtp_host) {
            return Err(ValidationError::MissingSmtpServer);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        match self.auth_type {
            SmtpAuthType::Basic => {
                if !present(&self.username) || !present_secret(&self.password) {
                    return Err(ValidationError::IncompleteBasicCredentials);
                }
            }
            SmtpAuthType::OAuth2 => {
                if !present(&self.client_id)
                    || !present_secret(&self.client_secret)
                    || !present_secret(&self.refresh_token)
                {
                    return Err(ValidationError::IncompleteOAuth2Credentials);
                }
            }
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            use_tls: default_use_tls(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            auth_type: SmtpAuthType::default(),
            username: None,
            password: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            token_url: None,
            scope: default_scope(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

fn default_from_email() -> String {
    "noreply@maturity.local".to_string()
}

fn default_from_name() -> String {
    "Maturity Assessment".to_string()
}

fn default_scope() -> String {
    "https://outlook.office365.com/.default".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_host: Some("smtp.example.com".to_string()),
            username: Some("mailer".to_string()),
            password: Some(Secret::new("hunter22".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_config_defaults() {
        let config = EmailConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.auth_type, SmtpAuthType::Basic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_header() {
        let config = EmailConfig {
            from_email: "support@example.com".to_string(),
            from_name: "Support Team".to_string(),
            ..Default::default()
        };
        assert_eq!(config.from_header(), "Support Team <support@example.com>");
    }

    #[test]
    fn test_enabled_requires_server_and_sender() {
        let config = EmailConfig {
            smtp_host: None,
            ..basic()
        };
        assert_eq!(config.validate(), Err(ValidationError::MissingSmtpServer));

        let config = EmailConfig {
            from_email: "invalid-email".to_string(),
            ..basic()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFromEmail));
    }

    #[test]
    fn test_basic_requires_username_and_password() {
        assert!(basic().validate().is_ok());
        let config = EmailConfig {
            password: None,
            ..basic()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::IncompleteBasicCredentials)
        );
    }

    #[test]
    fn test_oauth2_requires_client_and_refresh_token() {
        let mut config = EmailConfig {
            auth_type: SmtpAuthType::OAuth2,
            client_id: Some("app-id".to_string()),
            client_secret: Some(Secret::new("app-secret".to_string())),
            ..basic()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::IncompleteOAuth2Credentials)
        );

        config.refresh_token = Some(Secret::new("refresh".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_url_defaults_to_tenant_endpoint() {
        let config = EmailConfig {
            tenant_id: Some("contoso".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
    }
}
