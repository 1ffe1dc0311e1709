//! Axum router for client administration.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_client, create_respondent, get_client, list_clients};
use crate::adapters::http::state::AppState;

/// Mounted under `/admin`.
///
/// - `GET /clients`, `POST /clients`
/// - `GET /clients/:id`
/// - `POST /clients/:id/respondents`
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", get(get_client))
        .route("/clients/:id/respondents", post(create_respondent))
}
