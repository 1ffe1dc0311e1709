//! LoginHandler - exchanges credentials for a bearer token.

use std::sync::Arc;

use crate::domain::foundation::{ActorKind, AuditRecord, AuthError, Principal, Timestamp};
use crate::ports::{
    record_quietly, AuditLog, ClientRepository, CredentialProvider, SessionIssuer,
};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub login: String,
    pub secret: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub principal: Principal,
}

pub struct LoginHandler {
    credentials: Arc<dyn CredentialProvider>,
    issuer: Arc<dyn SessionIssuer>,
    clients: Arc<dyn ClientRepository>,
    audit: Arc<dyn AuditLog>,
}

impl LoginHandler {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        issuer: Arc<dyn SessionIssuer>,
        clients: Arc<dyn ClientRepository>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            credentials,
            issuer,
            clients,
            audit,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginResult, AuthError> {
        // 1. Verify; failed attempts are audited without an actor
        let principal = match self.credentials.verify(&cmd.login, &cmd.secret).await {
            Ok(principal) => principal,
            Err(err) => {
                tracing::info!(login = %cmd.login, error = %err, "Login rejected");
                record_quietly(
                    self.audit.as_ref(),
                    AuditRecord::anonymous(ActorKind::Public, "auth.login_failed", "session")
                        .describe(format!("Login failed for {}", cmd.login))
                        .detail(serde_json::json!({ "reason": err.to_string() }))
                        .from_ip(cmd.ip.clone()),
                )
                .await;
                return Err(err);
            }
        };

        // 2. Stamp respondent access
        if let Principal::Respondent { respondent_id, .. } = &principal {
            if let Err(err) = self
                .clients
                .record_access(*respondent_id, Timestamp::now())
                .await
            {
                tracing::warn!(
                    respondent_id = %respondent_id,
                    error = %err,
                    "Failed to stamp last access"
                );
            }
        }

        // 3. Issue the token
        let token = self.issuer.issue(&principal).await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&principal, "auth.login", "session")
                .describe(format!("{} logged in", principal.display_name()))
                .from_ip(cmd.ip),
        )
        .await;
        Ok(LoginResult { token, principal })
    }
}
