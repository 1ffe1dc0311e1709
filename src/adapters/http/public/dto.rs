//! Request DTOs for the public intake endpoints.

use serde::Deserialize;

use crate::domain::public::ContactInput;

/// Query string of the intake entry point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartIntakeParams {
    /// Audience tag (cohort, event, campaign).
    pub group: Option<String>,
}

/// Contact capture form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}

impl From<ContactRequest> for ContactInput {
    fn from(req: ContactRequest) -> Self {
        ContactInput {
            name: req.name,
            email: req.email,
            phone: req.phone,
            role: req.role,
            company: req.company,
        }
    }
}

/// Request to mail the result to an address.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverResultRequest {
    pub email: String,
}
