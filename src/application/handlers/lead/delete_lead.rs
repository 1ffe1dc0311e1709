//! DeleteLeadHandler - removes a lead with its public assessment.

use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::application::handlers::lookup::require_lead;
use crate::domain::foundation::{AuditRecord, DomainError, LeadId, Principal};
use crate::ports::{record_quietly, AuditLog, LeadRepository};

#[derive(Debug, Clone)]
pub struct DeleteLeadCommand {
    pub lead_id: LeadId,
    pub actor: Principal,
}

/// The only path that removes a completed public assessment. History,
/// responses and the assessment itself go with the lead.
pub struct DeleteLeadHandler {
    leads: Arc<dyn LeadRepository>,
    audit: Arc<dyn AuditLog>,
}

impl DeleteLeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { leads, audit }
    }

    pub async fn handle(&self, cmd: DeleteLeadCommand) -> Result<(), DomainError> {
        require_admin(&cmd.actor)?;
        let lead = require_lead(self.leads.as_ref(), cmd.lead_id).await?;
        self.leads.delete_cascade(lead.id).await?;

        tracing::info!(lead_id = %lead.id, public_assessment_id = %lead.public_assessment_id, "Lead deleted");
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "lead.deleted", "lead")
                .entity(lead.id, Some(lead.display_name()))
                .detail(serde_json::json!({
                    "public_assessment_id": lead.public_assessment_id,
                })),
        )
        .await;
        Ok(())
    }
}
