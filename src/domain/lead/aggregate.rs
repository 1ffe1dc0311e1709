//! Lead aggregate and its append-only history.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LeadPriority, LeadStatus};
use crate::domain::foundation::{
    non_blank, required_text, DomainError, ErrorCode, LeadId, PublicAssessmentId, Timestamp,
};
use crate::domain::public::{ContactDetails, PublicAssessment};
use crate::domain::scoring::PublicScores;

/// Kind of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadAction {
    Created,
    StatusChanged,
    PriorityChanged,
    Assigned,
    NotesUpdated,
    Comment,
}

impl LeadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadAction::Created => "created",
            LeadAction::StatusChanged => "status_changed",
            LeadAction::PriorityChanged => "priority_changed",
            LeadAction::Assigned => "assigned",
            LeadAction::NotesUpdated => "notes_updated",
            LeadAction::Comment => "comment",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            LeadAction::Created,
            LeadAction::StatusChanged,
            LeadAction::PriorityChanged,
            LeadAction::Assigned,
            LeadAction::NotesUpdated,
            LeadAction::Comment,
        ]
        .into_iter()
        .find(|a| a.as_str() == raw)
    }
}

impl fmt::Display for LeadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a lead's append-only log. Timestamps are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadHistoryEntry {
    pub action: LeadAction,
    pub actor: Option<String>,
    pub detail: String,
    pub at: Timestamp,
}

impl LeadHistoryEntry {
    pub fn new(
        action: LeadAction,
        actor: Option<&str>,
        detail: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            action,
            actor: actor.map(str::to_string),
            detail: detail.into(),
            at,
        }
    }
}

/// Score of one domain captured at materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadDomainScore {
    pub name: String,
    pub score: f64,
}

/// Everything a new lead is created from.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDraft {
    pub public_assessment_id: PublicAssessmentId,
    pub contact: ContactDetails,
    pub type_name: String,
    pub overall_score: f64,
    pub domain_scores: Vec<LeadDomainScore>,
    pub created_at: Timestamp,
}

impl LeadDraft {
    /// Snapshots a public assessment. The type name is copied so that later
    /// renames do not rewrite existing leads.
    pub fn from_assessment(
        assessment: &PublicAssessment,
        type_name: &str,
        scores: &PublicScores,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if assessment.contact().email.is_none() {
            return Err(DomainError::new(
                ErrorCode::MissingEmail,
                "A lead requires the visitor's email address",
            )
            .with_detail("field", "email")
            .with_detail("public_assessment_id", assessment.id().to_string()));
        }
        Ok(Self {
            public_assessment_id: assessment.id(),
            contact: assessment.contact().clone(),
            type_name: type_name.to_string(),
            overall_score: scores.overall,
            domain_scores: scores
                .domains
                .iter()
                .map(|d| LeadDomainScore {
                    name: d.name.clone(),
                    score: d.score,
                })
                .collect(),
            created_at: now,
        })
    }

    /// The history entry written together with the lead.
    pub fn created_entry(&self) -> LeadHistoryEntry {
        LeadHistoryEntry::new(
            LeadAction::Created,
            None,
            format!(
                "Lead created automatically from public assessment #{}",
                self.public_assessment_id
            ),
            self.created_at,
        )
    }
}

/// Fields an admin may change in one update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadUpdate {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    /// `Some(None)` clears the assignee.
    pub assignee: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// A contact materialized from a completed public assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub public_assessment_id: PublicAssessmentId,
    pub contact: ContactDetails,
    pub type_name: String,
    pub overall_score: f64,
    pub domain_scores: Vec<LeadDomainScore>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub notes: Option<String>,
    pub assignee: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lead {
    /// A new lead starts as `new` with `medium` priority.
    pub fn new(id: LeadId, draft: LeadDraft) -> Self {
        Self {
            id,
            public_assessment_id: draft.public_assessment_id,
            contact: draft.contact,
            type_name: draft.type_name,
            overall_score: draft.overall_score,
            domain_scores: draft.domain_scores,
            status: LeadStatus::New,
            priority: LeadPriority::Medium,
            notes: None,
            assignee: None,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }

    pub fn display_name(&self) -> &str {
        self.contact
            .name
            .as_deref()
            .or(self.contact.email.as_ref().map(|e| e.as_str()))
            .unwrap_or("anonymous")
    }

    /// Moves to `status`; no entry when the status is unchanged.
    pub fn transition(
        &mut self,
        status: LeadStatus,
        actor: Option<&str>,
        now: Timestamp,
    ) -> Option<LeadHistoryEntry> {
        if self.status == status {
            return None;
        }
        let detail = format!("Status changed from \"{}\" to \"{}\"", self.status, status);
        self.status = status;
        self.updated_at = now;
        Some(LeadHistoryEntry::new(LeadAction::StatusChanged, actor, detail, now))
    }

    pub fn set_priority(
        &mut self,
        priority: LeadPriority,
        actor: Option<&str>,
        now: Timestamp,
    ) -> Option<LeadHistoryEntry> {
        if self.priority == priority {
            return None;
        }
        let detail = format!("Priority changed from \"{}\" to \"{}\"", self.priority, priority);
        self.priority = priority;
        self.updated_at = now;
        Some(LeadHistoryEntry::new(LeadAction::PriorityChanged, actor, detail, now))
    }

    pub fn assign(
        &mut self,
        assignee: Option<String>,
        actor: Option<&str>,
        now: Timestamp,
    ) -> Option<LeadHistoryEntry> {
        let assignee = non_blank(assignee);
        if self.assignee == assignee {
            return None;
        }
        let detail = match &assignee {
            Some(who) => format!("Assigned to {}", who),
            None => "Assignment removed".to_string(),
        };
        self.assignee = assignee;
        self.updated_at = now;
        Some(LeadHistoryEntry::new(LeadAction::Assigned, actor, detail, now))
    }

    pub fn comment(
        &mut self,
        actor: Option<&str>,
        text: &str,
        now: Timestamp,
    ) -> Result<LeadHistoryEntry, DomainError> {
        let text = required_text("comment", text)?;
        self.updated_at = now;
        Ok(LeadHistoryEntry::new(LeadAction::Comment, actor, text, now))
    }

    /// Applies every changed field, one history entry per change.
    pub fn apply_update(
        &mut self,
        update: LeadUpdate,
        actor: Option<&str>,
        now: Timestamp,
    ) -> Vec<LeadHistoryEntry> {
        let mut entries = Vec::new();
        if let Some(status) = update.status {
            entries.extend(self.transition(status, actor, now));
        }
        if let Some(priority) = update.priority {
            entries.extend(self.set_priority(priority, actor, now));
        }
        if let Some(assignee) = update.assignee {
            entries.extend(self.assign(assignee, actor, now));
        }
        if let Some(notes) = update.notes {
            let notes = non_blank(notes);
            if notes != self.notes {
                self.notes = notes;
                self.updated_at = now;
                entries.push(LeadHistoryEntry::new(
                    LeadAction::NotesUpdated,
                    actor,
                    "Notes updated",
                    now,
                ));
            }
        }
        entries
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::foundation::{EmailAddress, TypeId, VersionId};
    use crate::domain::public::{GroupTag, ResultToken};
    use crate::domain::scoring::MaturityLevel;

    pub fn completed_assessment(id: i64, email: Option<&str>) -> PublicAssessment {
        PublicAssessment::reconstitute(
            PublicAssessmentId::new(id),
            TypeId::new(1),
            VersionId::new(1),
            ResultToken::generate(),
            GroupTag::parse(Some("campaign")).unwrap(),
            ContactDetails {
                name: Some("Dana".into()),
                email: email.map(|e| EmailAddress::parse(e).unwrap()),
                company: Some("Acme".into()),
                ..Default::default()
            },
            None,
            Timestamp::now(),
            Some(Timestamp::now()),
        )
    }

    pub fn lead(id: i64, score: f64) -> Lead {
        let scores = PublicScores {
            overall: score,
            responses: 1,
            maturity: MaturityLevel::from_percentage(score),
            domains: vec![],
        };
        let draft = LeadDraft::from_assessment(
            &completed_assessment(id, Some("dana@acme.io")),
            "Cyber",
            &scores,
            Timestamp::now(),
        )
        .unwrap();
        Lead::new(LeadId::new(id), draft)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::domain::foundation::DomainId;
    use crate::domain::scoring::{MaturityLevel, PublicDomainScore};

    #[test]
    fn draft_requires_email() {
        let scores = PublicScores {
            overall: 0.0,
            responses: 0,
            maturity: MaturityLevel::Initial,
            domains: vec![],
        };
        let err = LeadDraft::from_assessment(
            &completed_assessment(1, None),
            "Cyber",
            &scores,
            Timestamp::now(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEmail);
    }

    #[test]
    fn draft_snapshots_scores_and_type_name() {
        let scores = PublicScores {
            overall: 75.0,
            responses: 4,
            maturity: MaturityLevel::Managed,
            domains: vec![PublicDomainScore {
                domain_id: DomainId::new(1),
                name: "Identity".into(),
                score: 75.0,
                responses: 4,
                maturity: MaturityLevel::Managed,
            }],
        };
        let draft = LeadDraft::from_assessment(
            &completed_assessment(9, Some("a@b.c")),
            "Cyber",
            &scores,
            Timestamp::now(),
        )
        .unwrap();
        assert_eq!(draft.type_name, "Cyber");
        assert_eq!(draft.domain_scores[0].name, "Identity");
        assert_eq!(
            draft.created_entry().detail,
            "Lead created automatically from public assessment #9"
        );
    }

    #[test]
    fn new_lead_defaults() {
        let lead = lead(1, 50.0);
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.priority, LeadPriority::Medium);
        assert_eq!(lead.display_name(), "Dana");
    }

    #[test]
    fn transition_records_from_and_to() {
        let mut lead = lead(1, 50.0);
        let entry = lead
            .transition(LeadStatus::Contacted, Some("sam"), Timestamp::now())
            .unwrap();
        assert_eq!(entry.action, LeadAction::StatusChanged);
        assert_eq!(entry.detail, "Status changed from \"new\" to \"contacted\"");
        assert_eq!(entry.actor.as_deref(), Some("sam"));
        assert!(lead
            .transition(LeadStatus::Contacted, None, Timestamp::now())
            .is_none());
    }

    #[test]
    fn update_emits_one_entry_per_changed_field() {
        let mut lead = lead(1, 50.0);
        let entries = lead.apply_update(
            LeadUpdate {
                status: Some(LeadStatus::Qualified),
                priority: Some(LeadPriority::Medium),
                assignee: Some(Some("sam".into())),
                notes: Some(Some("call back".into())),
            },
            Some("root"),
            Timestamp::now(),
        );
        let actions: Vec<LeadAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                LeadAction::StatusChanged,
                LeadAction::Assigned,
                LeadAction::NotesUpdated
            ]
        );
        assert_eq!(lead.assignee.as_deref(), Some("sam"));
    }

    #[test]
    fn blank_comment_is_rejected() {
        let mut lead = lead(1, 50.0);
        assert!(lead.comment(Some("sam"), "  ", Timestamp::now()).is_err());
        let entry = lead.comment(Some("sam"), "Left a voicemail", Timestamp::now()).unwrap();
        assert_eq!(entry.action, LeadAction::Comment);
    }
}
