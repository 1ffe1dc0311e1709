//! Axum router for catalog administration.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    add_domain, add_question, clone_type, configure_intake, create_draft, create_type,
    delete_domain, delete_draft, delete_question, get_light_subset, get_type, get_version,
    list_types, publish_version, reorder_domains, reorder_questions, update_domain,
    update_question, update_type, update_version_notes,
};
use crate::adapters::http::state::AppState;

/// Create the catalog router, mounted under `/admin`.
///
/// # Routes
///
/// ## Types
/// - `GET /types`, `POST /types`
/// - `GET /types/:id`, `PATCH /types/:id`
/// - `POST /types/:id/clone`
/// - `PUT /types/:id/intake`
///
/// ## Versions
/// - `GET /versions/:id`, `PATCH /versions/:id`, `DELETE /versions/:id`
/// - `GET /versions/:id/light`
/// - `POST /versions/:id/publish`
/// - `POST /versions/:id/drafts`
/// - `POST /versions/:id/domains`, `PUT /versions/:id/domains/order`
///
/// ## Draft structure
/// - `PUT /domains/:id`, `DELETE /domains/:id`
/// - `POST /domains/:id/questions`, `PUT /domains/:id/questions/order`
/// - `PUT /questions/:id`, `DELETE /questions/:id`
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/types", get(list_types).post(create_type))
        .route("/types/:id", get(get_type).patch(update_type))
        .route("/types/:id/clone", post(clone_type))
        .route("/types/:id/intake", put(configure_intake))
        .route(
            "/versions/:id",
            get(get_version)
                .patch(update_version_notes)
                .delete(delete_draft),
        )
        .route("/versions/:id/light", get(get_light_subset))
        .route("/versions/:id/publish", post(publish_version))
        .route("/versions/:id/drafts", post(create_draft))
        .route("/versions/:id/domains", post(add_domain))
        .route("/versions/:id/domains/order", put(reorder_domains))
        .route("/domains/:id", put(update_domain).delete(delete_domain))
        .route("/domains/:id/questions", post(add_question))
        .route("/domains/:id/questions/order", put(reorder_questions))
        .route(
            "/questions/:id",
            put(update_question).delete(delete_question),
        )
}
