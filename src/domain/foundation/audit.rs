//! Audit records emitted on state transitions and logins.

use serde::Serialize;

use super::{Principal, Timestamp};

/// Who performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Admin,
    Respondent,
    Public,
    System,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Admin => "admin",
            ActorKind::Respondent => "respondent",
            ActorKind::Public => "public",
            ActorKind::System => "system",
        }
    }
}

/// One entry of the write-only audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub actor_kind: ActorKind,
    pub actor_id: Option<String>,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub description: String,
    pub detail: serde_json::Value,
    pub ip: Option<String>,
    pub at: Timestamp,
}

impl AuditRecord {
    /// Starts a record for an action performed by `principal`.
    pub fn by(principal: &Principal, action: impl Into<String>, entity_kind: &str) -> Self {
        let actor_kind = if principal.is_admin() {
            ActorKind::Admin
        } else {
            ActorKind::Respondent
        };
        Self::new(actor_kind, Some(principal.login().to_string()), action, entity_kind)
    }

    /// Starts a record for an action performed without an authenticated caller.
    pub fn anonymous(actor_kind: ActorKind, action: impl Into<String>, entity_kind: &str) -> Self {
        Self::new(actor_kind, None, action, entity_kind)
    }

    fn new(
        actor_kind: ActorKind,
        actor_id: Option<String>,
        action: impl Into<String>,
        entity_kind: &str,
    ) -> Self {
        Self {
            actor_kind,
            actor_id,
            action: action.into(),
            entity_kind: entity_kind.to_string(),
            entity_id: None,
            entity_name: None,
            description: String::new(),
            detail: serde_json::Value::Null,
            ip: None,
            at: Timestamp::now(),
        }
    }

    pub fn entity(mut self, id: impl ToString, name: Option<&str>) -> Self {
        self.entity_id = Some(id.to_string());
        self.entity_name = name.map(str::to_string);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn from_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }
}
