//! Client organizations and their respondents.

use serde::Serialize;

use crate::domain::foundation::{
    non_blank, required_text, ClientId, DomainError, EmailAddress, RespondentId, Timestamp,
    ValidationError,
};

/// An organization that commissions assessments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub trade_name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub location: Option<String>,
    pub segment: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
}

/// Validated input for a new client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub trade_name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub location: Option<String>,
    pub segment: Option<String>,
}

impl ClientDraft {
    pub fn new(
        trade_name: &str,
        legal_name: Option<String>,
        tax_id: Option<String>,
        location: Option<String>,
        segment: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            trade_name: required_text("trade_name", trade_name)?,
            legal_name: non_blank(legal_name),
            tax_id: non_blank(tax_id),
            location: non_blank(location),
            segment: non_blank(segment),
        })
    }
}

/// A person who answers project questionnaires for one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Respondent {
    pub id: RespondentId,
    pub client_id: ClientId,
    pub login: EmailAddress,
    #[serde(skip_serializing)]
    pub secret_digest: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub active: bool,
    pub must_rotate_credentials: bool,
    pub last_access_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Respondent {
    /// Fails unless the respondent belongs to `client`.
    pub fn ensure_belongs_to(&self, client: ClientId) -> Result<(), DomainError> {
        if self.client_id == client {
            Ok(())
        } else {
            Err(DomainError::validation(
                "respondent_id",
                format!(
                    "Respondent {} does not belong to client {}",
                    self.id, client
                ),
            ))
        }
    }
}

/// Validated input for a new respondent. The secret arrives already
/// digested by the credential provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RespondentDraft {
    pub client_id: ClientId,
    pub login: EmailAddress,
    pub secret_digest: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
}

impl RespondentDraft {
    pub fn new(
        client_id: ClientId,
        login: &str,
        secret_digest: String,
        display_name: &str,
        role: Option<String>,
        department: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            client_id,
            login: EmailAddress::parse_field("login", login)?,
            secret_digest,
            display_name: required_text("display_name", display_name)?,
            role: non_blank(role),
            department: non_blank(department),
        })
    }
}
