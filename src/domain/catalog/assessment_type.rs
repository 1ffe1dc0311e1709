//! Assessment types: named questionnaire families.

use serde::Serialize;

use crate::domain::foundation::{
    non_blank, parse_recipient_list, required_text, DomainError, EmailAddress, ErrorCode,
    Timestamp, TypeId, ValidationError,
};

/// A named questionnaire family such as "Cybersecurity".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentType {
    pub id: TypeId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub public_intake_enabled: bool,
    pub notification_recipients: Vec<String>,
    pub cta_text: Option<String>,
    pub created_at: Timestamp,
}

impl AssessmentType {
    /// Fails unless anonymous visitors may take this questionnaire.
    pub fn ensure_public_intake(&self) -> Result<(), DomainError> {
        if self.active && self.public_intake_enabled {
            Ok(())
        } else {
            Err(DomainError::precondition(format!(
                "Public intake is not enabled for '{}'",
                self.name
            ))
            .with_detail("type_id", self.id.to_string()))
        }
    }

    pub fn apply_intake_settings(&mut self, settings: PublicIntakeSettings) {
        self.public_intake_enabled = settings.enabled;
        self.notification_recipients = settings.recipients;
        self.cta_text = settings.cta_text;
    }
}

/// Validated input for a new type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDraft {
    pub name: String,
    pub description: Option<String>,
}

impl TypeDraft {
    pub fn new(name: &str, description: Option<String>) -> Result<Self, ValidationError> {
        let name = required_text("name", name)?;
        if name.chars().count() > 100 {
            return Err(ValidationError::invalid_format(
                "name",
                "must be at most 100 characters",
            ));
        }
        Ok(Self {
            name,
            description: non_blank(description),
        })
    }
}

/// Public-intake configuration of a type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublicIntakeSettings {
    pub enabled: bool,
    pub recipients: Vec<String>,
    pub cta_text: Option<String>,
}

impl PublicIntakeSettings {
    /// Builds settings from the raw recipient string entered by an admin.
    pub fn parse(
        enabled: bool,
        recipients: &str,
        cta_text: Option<String>,
    ) -> Result<Self, DomainError> {
        let recipients = parse_recipient_list(recipients)
            .into_iter()
            .map(|raw| {
                EmailAddress::parse_field("notification_recipients", &raw)
                    .map(String::from)
                    .map_err(DomainError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            enabled,
            recipients,
            cta_text: non_blank(cta_text),
        })
    }
}

/// Rejects names already used by another type.
pub fn ensure_unique_type_name(
    existing: &[AssessmentType],
    name: &str,
    exclude: Option<TypeId>,
) -> Result<(), DomainError> {
    let taken = existing
        .iter()
        .filter(|t| Some(t.id) != exclude)
        .any(|t| t.name.eq_ignore_ascii_case(name));
    if taken {
        Err(DomainError::new(
            ErrorCode::TypeNameTaken,
            format!("An assessment type named '{}' already exists", name),
        )
        .with_detail("field", "name"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;

    fn cyber() -> AssessmentType {
        AssessmentType {
            id: TypeId::new(1),
            name: "Cybersecurity".into(),
            description: None,
            active: true,
            public_intake_enabled: false,
            notification_recipients: vec![],
            cta_text: None,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn public_intake_requires_flag() {
        let mut t = cyber();
        assert_eq!(
            t.ensure_public_intake().unwrap_err().kind(),
            ErrorKind::PreconditionFailed
        );
        t.apply_intake_settings(PublicIntakeSettings {
            enabled: true,
            ..Default::default()
        });
        assert!(t.ensure_public_intake().is_ok());
    }

    #[test]
    fn inactive_type_refuses_public_intake() {
        let mut t = cyber();
        t.public_intake_enabled = true;
        t.active = false;
        assert!(t.ensure_public_intake().is_err());
    }

    #[test]
    fn intake_settings_parse_recipients() {
        let settings =
            PublicIntakeSettings::parse(true, "sales@x.io; ceo@x.io", Some("Talk to us".into()))
                .unwrap();
        assert_eq!(settings.recipients, vec!["sales@x.io", "ceo@x.io"]);
        assert_eq!(settings.cta_text.as_deref(), Some("Talk to us"));
    }

    #[test]
    fn intake_settings_reject_bad_recipient() {
        let err = PublicIntakeSettings::parse(true, "sales@x.io, nobody", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn duplicate_name_is_a_conflict() {
        let existing = vec![cyber()];
        let err = ensure_unique_type_name(&existing, "cybersecurity", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(ensure_unique_type_name(&existing, "Cybersecurity", Some(TypeId::new(1))).is_ok());
    }
}
