//! Request DTOs for client organizations and their respondents.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    pub trade_name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub location: Option<String>,
    pub segment: Option<String>,
}

/// New respondent account. The secret is digested before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRespondentRequest {
    pub login: String,
    pub secret: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
}
