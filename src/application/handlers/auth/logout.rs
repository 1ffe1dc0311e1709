//! LogoutHandler - revokes a bearer token.

use std::sync::Arc;

use crate::domain::foundation::{AuditRecord, AuthError, Principal};
use crate::ports::{record_quietly, AuditLog, SessionIssuer};

#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub token: String,
    pub principal: Principal,
    pub ip: Option<String>,
}

pub struct LogoutHandler {
    issuer: Arc<dyn SessionIssuer>,
    audit: Arc<dyn AuditLog>,
}

impl LogoutHandler {
    pub fn new(issuer: Arc<dyn SessionIssuer>, audit: Arc<dyn AuditLog>) -> Self {
        Self { issuer, audit }
    }

    pub async fn handle(&self, cmd: LogoutCommand) -> Result<(), AuthError> {
        self.issuer.revoke(&cmd.token).await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.principal, "auth.logout", "session")
                .describe(format!("{} logged out", cmd.principal.display_name()))
                .from_ip(cmd.ip),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::InMemorySessionStore;
    use crate::application::handlers::testing::Fixture;
    use crate::ports::SessionValidator;

    #[tokio::test]
    async fn logout_revokes_token_and_audits() {
        let fixture = Fixture::new();
        let sessions = InMemorySessionStore::new(3600);
        let principal = Principal::admin("admin@maturity.test", "Admin");
        let token = sessions.issue(&principal).await.unwrap();

        LogoutHandler::new(Arc::new(sessions.clone()), fixture.audit_log())
            .handle(LogoutCommand {
                token: token.clone(),
                principal,
                ip: None,
            })
            .await
            .unwrap();

        assert_eq!(sessions.validate(&token).await, Err(AuthError::InvalidToken));
        assert_eq!(fixture.audit.actions().await, vec!["auth.logout"]);
    }
}
