//! UpdateLeadHandler - status, priority, assignee and notes in one call.

use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::application::handlers::lookup::require_lead;
use crate::domain::foundation::{AuditRecord, DomainError, LeadId, Principal, Timestamp};
use crate::domain::lead::{Lead, LeadHistoryEntry, LeadUpdate};
use crate::ports::{record_quietly, AuditLog, LeadRepository};

#[derive(Debug, Clone)]
pub struct UpdateLeadCommand {
    pub lead_id: LeadId,
    pub update: LeadUpdate,
    pub actor: Principal,
}

#[derive(Debug, Clone)]
pub struct UpdateLeadResult {
    pub lead: Lead,
    /// One entry per field that actually changed.
    pub entries: Vec<LeadHistoryEntry>,
}

pub struct UpdateLeadHandler {
    leads: Arc<dyn LeadRepository>,
    audit: Arc<dyn AuditLog>,
}

impl UpdateLeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { leads, audit }
    }

    pub async fn handle(&self, cmd: UpdateLeadCommand) -> Result<UpdateLeadResult, DomainError> {
        require_admin(&cmd.actor)?;
        let mut lead = require_lead(self.leads.as_ref(), cmd.lead_id).await?;
        let before = lead.status;

        let entries = lead.apply_update(cmd.update, Some(cmd.actor.login()), Timestamp::now());
        if entries.is_empty() {
            return Ok(UpdateLeadResult { lead, entries });
        }
        self.leads.save(&lead, &entries).await?;

        let record = AuditRecord::by(&cmd.actor, "lead.updated", "lead")
            .entity(lead.id, Some(lead.display_name()))
            .describe(
                entries
                    .iter()
                    .map(|e| e.detail.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
            .detail(serde_json::json!({
                "status_before": before,
                "status": lead.status,
                "priority": lead.priority,
                "assignee": lead.assignee,
            }));
        record_quietly(self.audit.as_ref(), record).await;

        Ok(UpdateLeadResult { lead, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::lead::{LeadAction, LeadPriority, LeadStatus};

    #[tokio::test]
    async fn one_history_entry_per_changed_field() {
        let fx = Fixture::new();
        let lead = fx.lead("dana@acme.io").await;
        let handler = UpdateLeadHandler::new(fx.leads(), fx.audit_log());

        let result = handler
            .handle(UpdateLeadCommand {
                lead_id: lead.id,
                update: LeadUpdate {
                    status: Some(LeadStatus::Contacted),
                    priority: Some(LeadPriority::Medium),
                    assignee: Some(Some("sam".into())),
                    notes: None,
                },
                actor: admin(),
            })
            .await
            .unwrap();

        let actions: Vec<LeadAction> = result.entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![LeadAction::StatusChanged, LeadAction::Assigned]);
        assert_eq!(
            result.entries[0].detail,
            "Status changed from \"new\" to \"contacted\""
        );
        assert_eq!(result.entries[0].actor.as_deref(), Some("admin@platform.test"));

        let history = fx.leads().history(lead.id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].action, LeadAction::Created);
    }

    #[tokio::test]
    async fn unchanged_update_writes_nothing() {
        let fx = Fixture::new();
        let lead = fx.lead("dana@acme.io").await;
        let result = UpdateLeadHandler::new(fx.leads(), fx.audit_log())
            .handle(UpdateLeadCommand {
                lead_id: lead.id,
                update: LeadUpdate {
                    status: Some(LeadStatus::New),
                    ..Default::default()
                },
                actor: admin(),
            })
            .await
            .unwrap();
        assert!(result.entries.is_empty());
        assert!(fx.audit.actions().await.iter().all(|a| a != "lead.updated"));
    }
}
