//! PublicAssessment aggregate - one anonymous run through a light questionnaire.

use serde::Serialize;

use super::ResultToken;
use crate::domain::foundation::{
    non_blank, DomainError, EmailAddress, ErrorCode, PublicAssessmentId, Timestamp, TypeId,
    ValidationError, VersionId,
};

/// Free-form campaign tag supplied through the intake URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupTag(String);

impl GroupTag {
    pub const MAX_LEN: usize = 100;

    /// Blank input yields no tag.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(ValidationError::invalid_format(
                "group",
                format!("must be at most {} characters", Self::MAX_LEN),
            ));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "group",
                "contains control characters",
            ));
        }
        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact fields as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}

/// Contact snapshot of a public assessment. Only the email is mandatory
/// at completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}

impl ContactDetails {
    /// Validates input; a missing email fails with `MissingEmail`.
    pub fn parse(input: ContactInput) -> Result<Self, DomainError> {
        let email = match non_blank(input.email) {
            None => {
                return Err(DomainError::new(
                    ErrorCode::MissingEmail,
                    "An email address is required to complete the assessment",
                )
                .with_detail("field", "email"))
            }
            Some(raw) => EmailAddress::parse(&raw)?,
        };
        Ok(Self {
            name: non_blank(input.name),
            email: Some(email),
            phone: non_blank(input.phone),
            role: non_blank(input.role),
            company: non_blank(input.company),
        })
    }
}

/// Validated input for a new public assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicAssessmentDraft {
    pub type_id: TypeId,
    pub version_id: VersionId,
    pub token: ResultToken,
    pub group_tag: Option<GroupTag>,
    pub source_ip: Option<String>,
    pub started_at: Timestamp,
}

/// An anonymous assessment; completed once contact details are captured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicAssessment {
    id: PublicAssessmentId,
    type_id: TypeId,
    version_id: VersionId,
    token: ResultToken,
    group_tag: Option<GroupTag>,
    contact: ContactDetails,
    source_ip: Option<String>,
    started_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl PublicAssessment {
    pub fn new(id: PublicAssessmentId, draft: PublicAssessmentDraft) -> Self {
        Self {
            id,
            type_id: draft.type_id,
            version_id: draft.version_id,
            token: draft.token,
            group_tag: draft.group_tag,
            contact: ContactDetails::default(),
            source_ip: draft.source_ip,
            started_at: draft.started_at,
            completed_at: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: PublicAssessmentId,
        type_id: TypeId,
        version_id: VersionId,
        token: ResultToken,
        group_tag: Option<GroupTag>,
        contact: ContactDetails,
        source_ip: Option<String>,
        started_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            type_id,
            version_id,
            token,
            group_tag,
            contact,
            source_ip,
            started_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> PublicAssessmentId {
        self.id
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn version_id(&self) -> VersionId {
        self.version_id
    }

    pub fn token(&self) -> &ResultToken {
        &self.token
    }

    pub fn group_tag(&self) -> Option<&GroupTag> {
        self.group_tag.as_ref()
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    pub fn source_ip(&self) -> Option<&str> {
        self.source_ip.as_deref()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Answers may be rewritten until completion.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_completed() {
            Err(DomainError::new(
                ErrorCode::AssessmentCompleted,
                "This assessment has already been completed",
            )
            .with_detail("public_assessment_id", self.id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Records contact details and the completion time.
    ///
    /// Returns `false` without touching anything if already completed.
    pub fn complete(&mut self, contact: ContactDetails, now: Timestamp) -> Result<bool, DomainError> {
        if self.is_completed() {
            return Ok(false);
        }
        if contact.email.is_none() {
            return Err(DomainError::new(
                ErrorCode::MissingEmail,
                "An email address is required to complete the assessment",
            )
            .with_detail("field", "email"));
        }
        self.contact = contact;
        self.completed_at = Some(now);
        Ok(true)
    }

    /// Stores the address a result summary is sent to.
    pub fn record_email(&mut self, email: EmailAddress) {
        self.contact.email = Some(email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;

    fn assessment() -> PublicAssessment {
        PublicAssessment::new(
            PublicAssessmentId::new(1),
            PublicAssessmentDraft {
                type_id: TypeId::new(1),
                version_id: VersionId::new(1),
                token: ResultToken::generate(),
                group_tag: GroupTag::parse(Some("campaign-Q3")).unwrap(),
                source_ip: Some("203.0.113.9".into()),
                started_at: Timestamp::now(),
            },
        )
    }

    fn contact(email: Option<&str>) -> ContactInput {
        ContactInput {
            email: email.map(str::to_string),
            company: Some("Acme".into()),
            ..Default::default()
        }
    }

    #[test]
    fn group_tag_blank_is_none() {
        assert_eq!(GroupTag::parse(Some("  ")).unwrap(), None);
        assert_eq!(GroupTag::parse(None).unwrap(), None);
        assert_eq!(
            GroupTag::parse(Some(" q3 ")).unwrap().unwrap().as_str(),
            "q3"
        );
        assert!(GroupTag::parse(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn contact_requires_email() {
        let err = ContactDetails::parse(contact(None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEmail);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn contact_rejects_malformed_email() {
        let err = ContactDetails::parse(contact(Some("nope"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn complete_is_a_noop_the_second_time() {
        let mut pa = assessment();
        let details = ContactDetails::parse(contact(Some("a@b.c"))).unwrap();
        assert!(pa.complete(details.clone(), Timestamp::now()).unwrap());
        let first = pa.completed_at();

        let other = ContactDetails::parse(contact(Some("z@y.x"))).unwrap();
        assert!(!pa.complete(other, Timestamp::now()).unwrap());
        assert_eq!(pa.completed_at(), first);
        assert_eq!(pa.contact().email.as_ref().unwrap().as_str(), "a@b.c");
    }

    #[test]
    fn completed_assessment_is_closed() {
        let mut pa = assessment();
        assert!(pa.ensure_open().is_ok());
        pa.complete(ContactDetails::parse(contact(Some("a@b.c"))).unwrap(), Timestamp::now())
            .unwrap();
        assert_eq!(pa.ensure_open().unwrap_err().code, ErrorCode::AssessmentCompleted);
    }
}
