//! HTTP DTOs for the lead pipeline.

use serde::Deserialize;

use crate::adapters::http::request::double_option;
use crate::domain::foundation::DomainError;
use crate::domain::lead::{LeadFilter, LeadPriority, LeadStatus, LeadUpdate};

/// Listing filters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl LeadListParams {
    /// Parses the filters; blank values mean "any".
    pub fn into_filter(self) -> Result<LeadFilter, DomainError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Ok(LeadFilter {
            status: present(self.status)
                .map(|s| s.trim().parse::<LeadStatus>())
                .transpose()?,
            priority: present(self.priority)
                .map(|p| p.trim().parse::<LeadPriority>())
                .transpose()?,
            search: present(self.search).map(|s| s.trim().to_string()),
        })
    }
}

/// Partial update. `null` clears assignee or notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl From<UpdateLeadRequest> for LeadUpdate {
    fn from(req: UpdateLeadRequest) -> Self {
        LeadUpdate {
            status: req.status,
            priority: req.priority,
            assignee: req.assignee,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}
