//! Lead listing filters and the pipeline dashboard.

use serde::Serialize;

use super::{Lead, LeadPriority, LeadStatus};

/// Criteria for the lead list. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    /// Case-insensitive match against name, email and company.
    pub search: Option<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.status.is_some_and(|s| s != lead.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != lead.priority) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let contact = &lead.contact;
                [
                    contact.name.as_deref(),
                    contact.email.as_ref().map(|e| e.as_str()),
                    contact.company.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Leads per score band of the overall percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBands {
    /// Below 40.
    pub low: usize,
    /// 40 up to but excluding 70.
    pub medium: usize,
    /// 70 and above.
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: usize,
}

/// Pipeline overview shown to administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadDashboard {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
    pub score_bands: ScoreBands,
}

impl LeadDashboard {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let by_status = LeadStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: leads.iter().filter(|l| l.status == status).count(),
            })
            .collect();
        let mut bands = ScoreBands::default();
        for lead in leads {
            if lead.overall_score < 40.0 {
                bands.low += 1;
            } else if lead.overall_score < 70.0 {
                bands.medium += 1;
            } else {
                bands.high += 1;
            }
        }
        Self {
            total: leads.len(),
            by_status,
            score_bands: bands,
        }
    }
}
