//! CommentOnLeadHandler - appends a free-text comment to a lead's history.

use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::application::handlers::lookup::require_lead;
use crate::domain::foundation::{AuditRecord, DomainError, LeadId, Principal, Timestamp};
use crate::domain::lead::LeadHistoryEntry;
use crate::ports::{record_quietly, AuditLog, LeadRepository};

#[derive(Debug, Clone)]
pub struct CommentOnLeadCommand {
    pub lead_id: LeadId,
    pub text: String,
    pub actor: Principal,
}

pub struct CommentOnLeadHandler {
    leads: Arc<dyn LeadRepository>,
    audit: Arc<dyn AuditLog>,
}

impl CommentOnLeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { leads, audit }
    }

    pub async fn handle(&self, cmd: CommentOnLeadCommand) -> Result<LeadHistoryEntry, DomainError> {
        require_admin(&cmd.actor)?;
        let mut lead = require_lead(self.leads.as_ref(), cmd.lead_id).await?;
        let entry = lead.comment(Some(cmd.actor.login()), &cmd.text, Timestamp::now())?;
        self.leads.save(&lead, std::slice::from_ref(&entry)).await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "lead.commented", "lead")
                .entity(lead.id, Some(lead.display_name())),
        )
        .await;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::ErrorKind;
    use crate::domain::lead::LeadAction;

    #[tokio::test]
    async fn comment_is_appended_and_blank_rejected() {
        let fx = Fixture::new();
        let lead = fx.lead("dana@acme.io").await;
        let handler = CommentOnLeadHandler::new(fx.leads(), fx.audit_log());
        let comment = |text: &str| CommentOnLeadCommand {
            lead_id: lead.id,
            text: text.into(),
            actor: admin(),
        };

        let entry = handler.handle(comment("  Called, follow up Friday ")).await.unwrap();
        assert_eq!(entry.action, LeadAction::Comment);
        assert_eq!(entry.detail, "Called, follow up Friday");

        let err = handler.handle(comment("   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.leads().history(lead.id).await.unwrap().len(), 2);
    }
}
