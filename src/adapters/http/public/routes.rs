//! Axum router for the public intake endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    deliver_result, get_contact_step, get_domain_step, get_result, start_intake, submit_contact,
    submit_domain_step,
};
use crate::adapters::http::state::AppState;

/// Create the public intake router.
///
/// # Routes
///
/// - `GET /:type_id` - Start or resume an intake (303 to the current step)
/// - `GET /:type_id/domain/:index` - Questions of one step
/// - `POST /:type_id/domain/:index` - Submit answers (303 to the next step)
/// - `GET /:type_id/data` - Contact capture view
/// - `POST /:type_id/data` - Complete the intake (303 to the result)
/// - `GET /:type_id/result/:token` - Scored summary
/// - `POST /:type_id/result/:token/email` - Mail the result
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/:type_id", get(start_intake))
        .route(
            "/:type_id/domain/:index",
            get(get_domain_step).post(submit_domain_step),
        )
        .route("/:type_id/data", get(get_contact_step).post(submit_contact))
        .route("/:type_id/result/:token", get(get_result))
        .route("/:type_id/result/:token/email", post(deliver_result))
}
