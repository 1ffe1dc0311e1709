//! DTOs for login and logout.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Principal;

/// Credentials submitted to `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub secret: String,
}

/// Issued session token and the principal it stands for.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub principal: Principal,
}
