//! CreateRespondentHandler - adds a login for a client's respondent.

use std::sync::Arc;

use crate::domain::client::{Respondent, RespondentDraft};
use crate::domain::foundation::{
    AuditRecord, ClientId, DomainError, ErrorCode, Principal, Timestamp, ValidationError,
};
use crate::ports::{record_quietly, AuditLog, ClientRepository, CredentialProvider};

/// Minimum length of an initial respondent secret.
pub const MIN_SECRET_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct CreateRespondentCommand {
    pub client_id: ClientId,
    pub login: String,
    pub secret: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub actor: Principal,
}

/// New respondents must rotate their initial secret on first login.
pub struct CreateRespondentHandler {
    clients: Arc<dyn ClientRepository>,
    credentials: Arc<dyn CredentialProvider>,
    audit: Arc<dyn AuditLog>,
}

impl CreateRespondentHandler {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        credentials: Arc<dyn CredentialProvider>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            clients,
            credentials,
            audit,
        }
    }

    pub async fn handle(&self, cmd: CreateRespondentCommand) -> Result<Respondent, DomainError> {
        // 1. Client must exist
        if self.clients.find_client(cmd.client_id).await?.is_none() {
            return Err(DomainError::not_found(
                ErrorCode::ClientNotFound,
                "Client",
                cmd.client_id,
            ));
        }

        // 2. Validate and digest the secret
        if cmd.secret.chars().count() < MIN_SECRET_LEN {
            return Err(ValidationError::invalid_format(
                "secret",
                format!("must be at least {} characters", MIN_SECRET_LEN),
            )
            .into());
        }
        let draft = RespondentDraft::new(
            cmd.client_id,
            &cmd.login,
            self.credentials.digest(&cmd.secret),
            &cmd.display_name,
            cmd.role,
            cmd.department,
        )?;

        // 3. Persist; a taken login is a conflict
        let respondent = self
            .clients
            .create_respondent(&draft, Timestamp::now())
            .await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "respondent.created", "respondent")
                .entity(respondent.id, Some(&respondent.display_name))
                .detail(serde_json::json!({ "client_id": respondent.client_id })),
        )
        .await;
        Ok(respondent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::{AuthError, ErrorKind};
    use async_trait::async_trait;

    struct ReversingCredentials;

    #[async_trait]
    impl CredentialProvider for ReversingCredentials {
        async fn verify(
            &self,
            _login: &str,
            _secret: &str,
        ) -> Result<crate::domain::foundation::Principal, AuthError> {
            Err(AuthError::InvalidCredentials)
        }

        fn digest(&self, secret: &str) -> String {
            secret.chars().rev().collect()
        }
    }

    fn command(client_id: ClientId, login: &str, secret: &str) -> CreateRespondentCommand {
        CreateRespondentCommand {
            client_id,
            login: login.into(),
            secret: secret.into(),
            display_name: "Ana".into(),
            role: Some("CISO".into()),
            department: None,
            actor: admin(),
        }
    }

    fn handler(fx: &Fixture) -> CreateRespondentHandler {
        CreateRespondentHandler::new(fx.clients(), Arc::new(ReversingCredentials), fx.audit_log())
    }

    #[tokio::test]
    async fn stores_digest_and_forces_rotation() {
        let fx = Fixture::new();
        let (client, _) = fx.client_with(&[]).await;

        let respondent = handler(&fx)
            .handle(command(client.id, "ana@acme.io", "s3cret-pass"))
            .await
            .unwrap();

        assert_eq!(respondent.secret_digest, "ssap-terc3s");
        assert!(respondent.must_rotate_credentials);
        assert_eq!(fx.audit.actions().await, vec!["respondent.created"]);
    }

    #[tokio::test]
    async fn duplicate_login_is_a_conflict() {
        let fx = Fixture::new();
        let (client, _) = fx.client_with(&["ana@acme.io"]).await;

        let err = handler(&fx)
            .handle(command(client.id, "ana@acme.io", "s3cret-pass"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn short_secret_and_unknown_client_are_rejected() {
        let fx = Fixture::new();
        let (client, _) = fx.client_with(&[]).await;

        let short = handler(&fx)
            .handle(command(client.id, "bo@acme.io", "short"))
            .await
            .unwrap_err();
        assert_eq!(short.details.get("field").map(String::as_str), Some("secret"));

        let missing = handler(&fx)
            .handle(command(ClientId::new(404), "bo@acme.io", "long-enough"))
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::ClientNotFound);
    }
}
