//! Axum router for authentication endpoints.

use axum::{routing::post, Router};

use super::handlers::{login, logout};
use crate::adapters::http::state::AppState;

/// # Routes
///
/// - `POST /login` - Issue a session token
/// - `POST /logout` - Revoke the current token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
