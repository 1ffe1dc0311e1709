//! HTTP handlers for session login and logout.

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use super::dto::{LoginRequest, LoginResponse};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{bearer_token, AuthRejection, RequireAuth};
use crate::adapters::http::request::client_ip;
use crate::adapters::http::state::AppState;
use crate::application::handlers::auth::{LoginCommand, LogoutCommand};

/// POST /auth/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .login_handler()
        .handle(LoginCommand {
            login: req.login,
            secret: req.secret,
            ip: client_ip(&headers),
        })
        .await?;

    Ok(Json(LoginResponse {
        token: result.token,
        principal: result.principal,
    }))
}

/// POST /auth/logout - revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    headers: HeaderMap,
) -> Result<StatusCode, axum::response::Response> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AuthRejection::Unauthenticated.into_response())?
        .to_string();

    state
        .logout_handler()
        .handle(LogoutCommand {
            token,
            principal,
            ip: client_ip(&headers),
        })
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    Ok(StatusCode::NO_CONTENT)
}
