//! HTTP handlers for client administration.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{CreateClientRequest, CreateRespondentRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::clients::{CreateClientCommand, CreateRespondentCommand};
use crate::domain::foundation::ClientId;

/// GET /admin/clients
pub async fn list_clients(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_queries().list().await?))
}

/// POST /admin/clients
pub async fn create_client(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(req): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state
        .create_client_handler()
        .handle(CreateClientCommand {
            trade_name: req.trade_name,
            legal_name: req.legal_name,
            tax_id: req.tax_id,
            location: req.location,
            segment: req.segment,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /admin/clients/:id - client with its respondents
pub async fn get_client(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(client_id): Path<ClientId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_queries().detail(client_id).await?))
}

/// POST /admin/clients/:id/respondents
pub async fn create_respondent(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(client_id): Path<ClientId>,
    Json(req): Json<CreateRespondentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let respondent = state
        .create_respondent_handler()
        .handle(CreateRespondentCommand {
            client_id,
            login: req.login,
            secret: req.secret,
            display_name: req.display_name,
            role: req.role,
            department: req.department,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(respondent)))
}
