//! Lead pipeline domain - leads, history, listing and dashboard.

mod aggregate;
mod dashboard;
mod status;

pub use aggregate::{
    Lead, LeadAction, LeadDomainScore, LeadDraft, LeadHistoryEntry, LeadUpdate,
};
pub use dashboard::{LeadDashboard, LeadFilter, ScoreBands, StatusCount};
pub use status::{LeadPriority, LeadStatus};

#[cfg(test)]
pub(crate) use aggregate::fixtures;
