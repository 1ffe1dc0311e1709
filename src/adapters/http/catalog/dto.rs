//! HTTP DTOs for the questionnaire catalog.

use serde::{Deserialize, Serialize};

use crate::adapters::http::request::double_option;
use crate::domain::catalog::{AssessmentType, AssessmentVersion};

fn yes() -> bool {
    true
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create an assessment type with its first draft.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTypeRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a type. `description: null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTypeRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub active: Option<bool>,
}

/// Request to clone a type's published version into a new type.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneTypeRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Public intake settings of a type.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureIntakeRequest {
    pub enabled: bool,
    /// Comma or semicolon separated addresses for lead alerts.
    #[serde(default)]
    pub recipients: String,
    pub cta_text: Option<String>,
}

/// Request to branch a new draft from an existing version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDraftRequest {
    pub label: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRequest {
    pub text: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub recommendation: Option<String>,
    #[serde(default)]
    pub light: bool,
    #[serde(default = "yes")]
    pub active: bool,
}

/// New order of the children of a version or domain; must be a permutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest<T> {
    pub order: Vec<T>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A new type together with its initial version.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCreatedResponse {
    pub assessment_type: AssessmentType,
    pub version: AssessmentVersion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_request_defaults() {
        let req: QuestionRequest = serde_json::from_str(r#"{"text": "MFA?"}"#).unwrap();
        assert!(!req.light);
        assert!(req.active);
    }

    #[test]
    fn update_type_distinguishes_clear_from_keep() {
        let keep: UpdateTypeRequest = serde_json::from_str(r#"{"name": "X"}"#).unwrap();
        let clear: UpdateTypeRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(keep.description, None);
        assert_eq!(clear.description, Some(None));
    }
}
