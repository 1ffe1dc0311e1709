//! Lead read handlers: filtered listing, detail with history, dashboard.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::access::require_admin;
use crate::application::handlers::lookup::require_lead;
use crate::domain::foundation::{DomainError, LeadId, Principal};
use crate::domain::lead::{Lead, LeadDashboard, LeadFilter, LeadHistoryEntry};
use crate::ports::LeadRepository;

#[derive(Debug, Clone, Serialize)]
pub struct LeadDetail {
    pub lead: Lead,
    pub history: Vec<LeadHistoryEntry>,
}

pub struct LeadQueries {
    leads: Arc<dyn LeadRepository>,
}

impl LeadQueries {
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    /// Newest first.
    pub async fn list(&self, actor: &Principal, filter: &LeadFilter) -> Result<Vec<Lead>, DomainError> {
        require_admin(actor)?;
        self.leads.list(filter).await
    }

    pub async fn detail(&self, actor: &Principal, lead_id: LeadId) -> Result<LeadDetail, DomainError> {
        require_admin(actor)?;
        let lead = require_lead(self.leads.as_ref(), lead_id).await?;
        let history = self.leads.history(lead_id).await?;
        Ok(LeadDetail { lead, history })
    }

    pub async fn dashboard(&self, actor: &Principal) -> Result<LeadDashboard, DomainError> {
        require_admin(actor)?;
        let leads = self.leads.list(&LeadFilter::default()).await?;
        Ok(LeadDashboard::from_leads(&leads))
    }
}
