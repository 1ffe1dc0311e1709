//! HTTP handlers for the lead pipeline (administrators only).

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{CommentRequest, LeadListParams, UpdateLeadRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::lead::{
    CommentOnLeadCommand, DeleteLeadCommand, UpdateLeadCommand,
};
use crate::domain::foundation::LeadId;

/// GET /admin/leads[?status=&priority=&search=]
pub async fn list_leads(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(params): Query<LeadListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.into_filter()?;
    Ok(Json(state.lead_queries().list(&actor, &filter).await?))
}

/// GET /admin/leads/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.lead_queries().dashboard(&actor).await?))
}

/// GET /admin/leads/:id - lead with its history
pub async fn get_lead(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(lead_id): Path<LeadId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.lead_queries().detail(&actor, lead_id).await?))
}

/// PATCH /admin/leads/:id
pub async fn update_lead(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(lead_id): Path<LeadId>,
    Json(req): Json<UpdateLeadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .update_lead_handler()
        .handle(UpdateLeadCommand {
            lead_id,
            update: req.into(),
            actor,
        })
        .await?;
    Ok(Json(result.lead))
}

/// POST /admin/leads/:id/comments
pub async fn comment_on_lead(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(lead_id): Path<LeadId>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .comment_lead_handler()
        .handle(CommentOnLeadCommand {
            lead_id,
            text: req.text,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /admin/leads/:id - removes the lead and its public assessment
pub async fn delete_lead(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(lead_id): Path<LeadId>,
) -> Result<StatusCode, ApiError> {
    state
        .delete_lead_handler()
        .handle(DeleteLeadCommand { lead_id, actor })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
