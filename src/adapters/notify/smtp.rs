//! SMTP email transport over lettre.
//!
//! Two authentication modes are supported:
//!
//! - basic: username and password (AUTH PLAIN/LOGIN)
//! - OAuth2: a refresh token is exchanged for an access token at the
//!   configured token endpoint, then presented with XOAUTH2
//!
//! Access tokens are cached until shortly before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::{EmailConfig, SmtpAuthType};
use crate::ports::{EmailTransport, NotificationError, OutgoingEmail};

/// Refresh this long before the provider's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct OAuth2Settings {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,
    pub scope: String,
}

#[derive(Clone)]
pub enum SmtpAuth {
    Basic {
        username: String,
        password: Secret<String>,
    },
    OAuth2 {
        username: String,
        settings: OAuth2Settings,
    },
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// STARTTLS when true, implicit TLS otherwise.
    pub starttls: bool,
    pub from: Mailbox,
    pub auth: SmtpAuth,
}

impl SmtpSettings {
    /// Builds transport settings from validated configuration.
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotificationError> {
        let missing =
            |what: &str| NotificationError::InvalidMessage(format!("{} not configured", what));
        let host = config
            .smtp_host
            .clone()
            .ok_or_else(|| missing("SMTP server"))?;
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::InvalidMessage(format!("from address: {}", e)))?;
        let auth = match config.auth_type {
            SmtpAuthType::Basic => SmtpAuth::Basic {
                username: config
                    .username
                    .clone()
                    .ok_or_else(|| missing("SMTP username"))?,
                password: config
                    .password
                    .clone()
                    .ok_or_else(|| missing("SMTP password"))?,
            },
            SmtpAuthType::OAuth2 => SmtpAuth::OAuth2 {
                username: config
                    .username
                    .clone()
                    .unwrap_or_else(|| config.from_email.clone()),
                settings: OAuth2Settings {
                    token_url: config.token_url(),
                    client_id: config
                        .client_id
                        .clone()
                        .ok_or_else(|| missing("OAuth2 client id"))?,
                    client_secret: config
                        .client_secret
                        .clone()
                        .ok_or_else(|| missing("OAuth2 client secret"))?,
                    refresh_token: config
                        .refresh_token
                        .clone()
                        .ok_or_else(|| missing("OAuth2 refresh token"))?,
                    scope: config.scope.clone(),
                },
            },
        };
        Ok(Self {
            host,
            port: config.smtp_port,
            starttls: config.use_tls,
            from,
            auth,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: Secret<String>,
    valid_until: Instant,
}

pub struct SmtpTransport {
    settings: SmtpSettings,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl SmtpTransport {
    pub fn new(settings: SmtpSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self, oauth: &OAuth2Settings) -> Result<String, NotificationError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.valid_until > Instant::now() {
                return Ok(token.value.expose_secret().clone());
            }
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.expose_secret().as_str()),
            ("refresh_token", oauth.refresh_token.expose_secret().as_str()),
            ("scope", oauth.scope.as_str()),
        ];
        let response = self
            .http
            .post(&oauth.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(format!("token endpoint: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OAuth2 token refresh rejected");
            return Err(NotificationError::Transport(format!(
                "token endpoint returned {}",
                status
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::Transport(format!("token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        *cached = Some(CachedToken {
            value: Secret::new(token.access_token.clone()),
            valid_until: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });
        Ok(token.access_token)
    }

    async fn mailer(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
        let builder = if self.settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.host)
        }
        .map_err(|e| NotificationError::Transport(e.to_string()))?
        .port(self.settings.port);

        let builder = match &self.settings.auth {
            SmtpAuth::Basic { username, password } => builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().clone(),
            )),
            SmtpAuth::OAuth2 { username, settings } => {
                let token = self.access_token(settings).await?;
                builder
                    .credentials(Credentials::new(username.clone(), token))
                    .authentication(vec![Mechanism::Xoauth2])
            }
        };
        Ok(builder.build())
    }
}

/// Builds a multipart/alternative message with the plain-text part first.
pub fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, NotificationError> {
    if email.to.is_empty() {
        return Err(NotificationError::NoRecipients);
    }
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(email.subject.clone());
    for recipient in &email.to {
        let mailbox = recipient
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::InvalidMessage(format!("{}: {}", recipient, e)))?;
        builder = builder.to(mailbox);
    }
    builder
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| NotificationError::InvalidMessage(e.to_string()))
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        let message = build_message(&self.settings.from, email)?;
        let mailer = self.mailer().await?;
        mailer.send(message).await.map_err(|e| {
            tracing::error!(host = %self.settings.host, error = %e, "SMTP delivery failed");
            NotificationError::Transport(e.to_string())
        })?;
        tracing::debug!(to = %email.to.join(", "), subject = %email.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &[&str]) -> OutgoingEmail {
        OutgoingEmail {
            to: to.iter().map(|t| t.to_string()).collect(),
            subject: "New Lead Captured - Cyber".into(),
            html_body: "<p>hi</p>".into(),
            text_body: "hi".into(),
        }
    }

    fn from() -> Mailbox {
        "Maturity <noreply@maturity.test>".parse().unwrap()
    }

    #[test]
    fn message_lists_every_recipient() {
        let message = build_message(&from(), &email(&["a@acme.test", "b@acme.test"])).unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 2);
    }

    #[test]
    fn message_requires_valid_recipients() {
        assert_eq!(
            build_message(&from(), &email(&[])).unwrap_err(),
            NotificationError::NoRecipients
        );
        assert!(matches!(
            build_message(&from(), &email(&["not an address"])),
            Err(NotificationError::InvalidMessage(_))
        ));
    }

    #[test]
    fn settings_follow_the_configured_auth_type() {
        let config = EmailConfig {
            enabled: true,
            smtp_host: Some("smtp.office365.com".into()),
            auth_type: SmtpAuthType::OAuth2,
            tenant_id: Some("contoso".into()),
            client_id: Some("app".into()),
            client_secret: Some(Secret::new("secret".into())),
            refresh_token: Some(Secret::new("refresh".into())),
            ..Default::default()
        };
        let settings = SmtpSettings::from_config(&config).unwrap();
        match settings.auth {
            SmtpAuth::OAuth2 { username, settings } => {
                assert_eq!(username, config.from_email);
                assert!(settings.token_url.contains("/contoso/"));
            }
            SmtpAuth::Basic { .. } => panic!("expected OAuth2"),
        }

        let basic = EmailConfig {
            auth_type: SmtpAuthType::Basic,
            ..config
        };
        assert!(SmtpSettings::from_config(&basic).is_err());
    }
}
