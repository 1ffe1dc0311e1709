//! HTTP adapter for group statistics over public assessments.
//!
//! - `GET /admin/groups` - Every (type, group) pair with completions
//! - `GET /admin/groups/:type_id/statistics[?group=]` - Aggregates for one
//!   group, or the whole type when `group` is absent

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::statistics::GroupStatisticsQuery;
use crate::domain::foundation::TypeId;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupParams {
    pub group: Option<String>,
}

/// GET /admin/groups
pub async fn list_groups(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.group_statistics_handler().list_groups(&actor).await?,
    ))
}

/// GET /admin/groups/:type_id/statistics
pub async fn group_statistics(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(type_id): Path<TypeId>,
    Query(params): Query<GroupParams>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .group_statistics_handler()
        .statistics(GroupStatisticsQuery {
            type_id,
            group: params.group,
            actor,
        })
        .await?;
    Ok(Json(report))
}

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups/:type_id/statistics", get(group_statistics))
}
