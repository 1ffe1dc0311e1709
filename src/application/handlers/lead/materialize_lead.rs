//! MaterializeLeadHandler - turns a public assessment into a lead, once.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_public_assessment, require_tree, require_type};
use crate::domain::foundation::{
    ActorKind, AuditRecord, DomainError, PublicAssessmentId, Timestamp,
};
use crate::domain::lead::{Lead, LeadDraft};
use crate::domain::public::answer_digest;
use crate::domain::scoring::score_public;
use crate::ports::{
    record_quietly, AuditLog, CatalogRepository, LeadRepository, NewLeadNotice, Notifier,
    PublicAssessmentRepository, ResponseRepository,
};

#[derive(Debug, Clone)]
pub struct MaterializeLeadCommand {
    pub public_assessment_id: PublicAssessmentId,
}

#[derive(Debug, Clone)]
pub struct MaterializeLeadResult {
    pub lead: Lead,
    /// `false` when the lead already existed.
    pub created: bool,
}

/// Idempotent: a second call for the same assessment returns the existing
/// lead without writing history or notifying again.
///
/// The new-lead alert is sent after the lead is stored; its failure is
/// logged and never undoes the lead.
pub struct MaterializeLeadHandler {
    catalog: Arc<dyn CatalogRepository>,
    public: Arc<dyn PublicAssessmentRepository>,
    responses: Arc<dyn ResponseRepository>,
    leads: Arc<dyn LeadRepository>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditLog>,
}

impl MaterializeLeadHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        public: Arc<dyn PublicAssessmentRepository>,
        responses: Arc<dyn ResponseRepository>,
        leads: Arc<dyn LeadRepository>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            catalog,
            public,
            responses,
            leads,
            notifier,
            audit,
        }
    }

    pub async fn handle(&self, cmd: MaterializeLeadCommand) -> Result<MaterializeLeadResult, DomainError> {
        // 1. Fast path for repeats
        if let Some(lead) = self
            .leads
            .find_by_public_assessment(cmd.public_assessment_id)
            .await?
        {
            return Ok(MaterializeLeadResult {
                lead,
                created: false,
            });
        }

        // 2. Score the assessment against the version it was taken on
        let assessment =
            require_public_assessment(self.public.as_ref(), cmd.public_assessment_id).await?;
        let assessment_type = require_type(self.catalog.as_ref(), assessment.type_id()).await?;
        let subset = require_tree(self.catalog.as_ref(), assessment.version_id())
            .await?
            .light_subset();
        let responses = self.responses.list_public_responses(assessment.id()).await?;
        let scores = score_public(&subset, &responses);

        // 3. Insert unless a concurrent call won
        let draft =
            LeadDraft::from_assessment(&assessment, &assessment_type.name, &scores, Timestamp::now())?;
        let (lead, created) = self.leads.insert_if_absent(&draft).await?;
        if !created {
            return Ok(MaterializeLeadResult { lead, created });
        }

        tracing::info!(
            lead_id = %lead.id,
            public_assessment_id = %assessment.id(),
            type_id = %assessment_type.id,
            overall = lead.overall_score,
            "Lead created"
        );
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::anonymous(ActorKind::System, "lead.created", "lead")
                .entity(lead.id, Some(lead.display_name()))
                .detail(serde_json::json!({
                    "public_assessment_id": assessment.id(),
                    "type": assessment_type.name,
                    "overall_score": lead.overall_score,
                })),
        )
        .await;

        // 4. Alert the type's recipients
        if assessment_type.notification_recipients.is_empty() {
            tracing::debug!(lead_id = %lead.id, "No lead recipients configured, skipping alert");
        } else {
            let notice = NewLeadNotice {
                lead: lead.clone(),
                type_name: assessment_type.name.clone(),
                recipients: assessment_type.notification_recipients.clone(),
                digest: answer_digest(&subset, &responses),
            };
            if let Err(error) = self.notifier.new_lead(&notice).await {
                tracing::warn!(
                    lead_id = %lead.id,
                    public_assessment_id = %assessment.id(),
                    error = %error,
                    "Lead notification failed"
                );
            }
        }

        Ok(MaterializeLeadResult { lead, created })
    }
}
