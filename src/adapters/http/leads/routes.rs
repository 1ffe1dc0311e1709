//! Axum router for the lead pipeline.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    comment_on_lead, delete_lead, get_dashboard, get_lead, list_leads, update_lead,
};
use crate::adapters::http::state::AppState;

/// Mounted under `/admin`.
///
/// - `GET /leads[?status=&priority=&search=]`
/// - `GET /leads/dashboard`
/// - `GET /leads/:id`, `PATCH /leads/:id`, `DELETE /leads/:id`
/// - `POST /leads/:id/comments`
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads))
        .route("/leads/dashboard", get(get_dashboard))
        .route(
            "/leads/:id",
            get(get_lead).patch(update_lead).delete(delete_lead),
        )
        .route("/leads/:id/comments", post(comment_on_lead))
}
