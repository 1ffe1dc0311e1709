//! Domains and questions that make up a version.

use serde::Serialize;

use crate::domain::foundation::{
    non_blank, required_text, DomainError, DomainId, QuestionId, ValidationError, VersionId,
};

/// A thematic section of a questionnaire version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    pub id: DomainId,
    pub version_id: VersionId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub active: bool,
}

/// One question inside a domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub domain_id: DomainId,
    pub text: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub recommendation: Option<String>,
    /// Included in the abridged public questionnaire.
    pub light: bool,
    pub position: i32,
    pub active: bool,
}

/// Editable attributes of a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainFields {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

impl DomainFields {
    pub fn new(
        name: &str,
        description: Option<String>,
        active: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", name)?,
            description: non_blank(description),
            active,
        })
    }
}

impl From<&Domain> for DomainFields {
    fn from(domain: &Domain) -> Self {
        Self {
            name: domain.name.clone(),
            description: domain.description.clone(),
            active: domain.active,
        }
    }
}

/// Editable attributes of a question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionFields {
    pub text: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub recommendation: Option<String>,
    pub light: bool,
    pub active: bool,
}

impl QuestionFields {
    pub fn new(
        text: &str,
        description: Option<String>,
        reference: Option<String>,
        recommendation: Option<String>,
        light: bool,
        active: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            text: required_text("text", text)?,
            description: non_blank(description),
            reference: non_blank(reference),
            recommendation: non_blank(recommendation),
            light,
            active,
        })
    }
}

impl From<&Question> for QuestionFields {
    fn from(question: &Question) -> Self {
        Self {
            text: question.text.clone(),
            description: question.description.clone(),
            reference: question.reference.clone(),
            recommendation: question.recommendation.clone(),
            light: question.light,
            active: question.active,
        }
    }
}

/// Checks that `ordered` is a permutation of `current` and returns the
/// position each id should take.
pub fn plan_reorder<Id>(current: &[Id], ordered: &[Id]) -> Result<Vec<(Id, i32)>, DomainError>
where
    Id: Copy + PartialEq + std::fmt::Display,
{
    if current.len() != ordered.len() {
        return Err(DomainError::validation(
            "order",
            format!(
                "Expected {} identifiers, got {}",
                current.len(),
                ordered.len()
            ),
        ));
    }
    for (index, id) in ordered.iter().enumerate() {
        if !current.contains(id) {
            return Err(DomainError::validation(
                "order",
                format!("{} does not belong to this parent", id),
            ));
        }
        if ordered[..index].contains(id) {
            return Err(DomainError::validation(
                "order",
                format!("{} appears more than once", id),
            ));
        }
    }
    Ok(ordered
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32 + 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_text_is_required() {
        assert!(QuestionFields::new(" ", None, None, None, true, true).is_err());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let fields =
            QuestionFields::new("Is MFA enforced?", Some(" ".into()), None, None, true, true)
                .unwrap();
        assert_eq!(fields.description, None);
    }

    #[test]
    fn reorder_assigns_one_based_positions() {
        let current = [QuestionId::new(1), QuestionId::new(2), QuestionId::new(3)];
        let ordered = [QuestionId::new(3), QuestionId::new(1), QuestionId::new(2)];
        let plan = plan_reorder(&current, &ordered).unwrap();
        assert_eq!(
            plan,
            vec![
                (QuestionId::new(3), 1),
                (QuestionId::new(1), 2),
                (QuestionId::new(2), 3)
            ]
        );
    }

    #[test]
    fn reorder_rejects_foreign_and_duplicate_ids() {
        let current = [DomainId::new(1), DomainId::new(2)];
        assert!(plan_reorder(&current, &[DomainId::new(1), DomainId::new(9)]).is_err());
        assert!(plan_reorder(&current, &[DomainId::new(1), DomainId::new(1)]).is_err());
        assert!(plan_reorder(&current, &[DomainId::new(1)]).is_err());
    }
}
