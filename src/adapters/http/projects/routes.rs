//! Axum routers for project administration and the respondent workspace.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    add_member, create_project, finalize_assessment, get_estimate, get_question_sheet,
    get_statistics, list_members, list_projects, my_projects, record_response, release_project,
    remove_member, update_project,
};
use crate::adapters::http::state::AppState;

/// Mounted under `/admin`.
///
/// - `GET /projects[?client_id=]`, `POST /projects`
/// - `GET /projects/:id` - Progress estimate
/// - `PATCH /projects/:id`
/// - `GET /projects/:id/respondents`, `POST /projects/:id/respondents`
/// - `DELETE /projects/:id/respondents/:respondent_id`
/// - `POST /projects/:id/release`
/// - `GET /projects/:id/statistics`
pub fn project_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_estimate).patch(update_project))
        .route(
            "/projects/:id/respondents",
            get(list_members).post(add_member),
        )
        .route(
            "/projects/:id/respondents/:respondent_id",
            delete(remove_member),
        )
        .route("/projects/:id/release", post(release_project))
        .route("/projects/:id/statistics", get(get_statistics))
}

/// Mounted under `/respondent`.
///
/// - `GET /projects`
/// - `GET /projects/:id`, `GET /projects/:id/statistics`
/// - `GET /assessments/:binding_id` - Question sheet
/// - `PUT /assessments/:binding_id/responses/:question_id` - Answer or un-answer
/// - `POST /assessments/:binding_id/finalize`
pub fn respondent_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(my_projects))
        .route("/projects/:id", get(get_estimate))
        .route("/projects/:id/statistics", get(get_statistics))
        .route("/assessments/:binding_id", get(get_question_sheet))
        .route(
            "/assessments/:binding_id/responses/:question_id",
            put(record_response),
        )
        .route("/assessments/:binding_id/finalize", post(finalize_assessment))
}
