//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - validates Bearer tokens and injects the [`Principal`]
//! - `RequireAuth` - any authenticated caller
//! - `RequireAdmin` / `RequireRespondent` - guards on the principal variant
//!
//! # Architecture
//!
//! The middleware uses the `SessionValidator` port, keeping it
//! provider-agnostic.
//!
//! ```text
//! Request → auth_middleware → injects Principal into extensions
//!                                      ↓
//!                              Handler → RequireAdmin extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::domain::foundation::Principal;
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates Bearer tokens.
///
/// A missing token continues without a principal so that public routes
/// stay reachable; an invalid one is rejected with 401.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_string);

    match token {
        Some(token) => match validator.validate(&token).await {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
                next.run(request).await
            }
            Err(e) => ApiError::from(e).into_response(),
        },
        None => next.run(request).await,
    }
}

fn principal(parts: &Parts) -> Result<Principal, AuthRejection> {
    parts
        .extensions
        .get::<Principal>()
        .cloned()
        .ok_or(AuthRejection::Unauthenticated)
}

/// Extractor that requires an authenticated caller of either kind.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

/// Extractor that requires an administrator.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Principal);

/// Extractor that requires a respondent.
#[derive(Debug, Clone)]
pub struct RequireRespondent(pub Principal);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal(parts).map(RequireAuth)
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = principal(parts)?;
        if principal.is_admin() {
            Ok(RequireAdmin(principal))
        } else {
            Err(AuthRejection::Forbidden("Administrator access required"))
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireRespondent
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal(parts)? {
            p @ Principal::Respondent { .. } => Ok(RequireRespondent(p)),
            Principal::Admin { .. } => Err(AuthRejection::Forbidden("Respondent access required")),
        }
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
    /// Authenticated, but the wrong kind of principal.
    Forbidden(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::Forbidden(message) => (StatusCode::FORBIDDEN, "FORBIDDEN", message),
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    use crate::domain::foundation::{ClientId, RespondentId};

    fn respondent() -> Principal {
        Principal::Respondent {
            respondent_id: RespondentId::new(2),
            client_id: ClientId::new(1),
            login: "bo@acme.test".into(),
            display_name: "Bo".into(),
        }
    }

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        if let Some(p) = principal {
            request.extensions_mut().insert(p);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn require_auth_fails_without_principal() {
        let mut parts = parts_with(None);
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_admin_rejects_respondent() {
        let mut parts = parts_with(Some(respondent()));
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Forbidden(_))));
    }

    #[tokio::test]
    async fn require_respondent_accepts_respondent() {
        let mut parts = parts_with(Some(respondent()));
        let RequireRespondent(p) = RequireRespondent::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(p.login(), "bo@acme.test");
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("authorization", "Bearer my-token".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("my-token"));

        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn forbidden_rejection_returns_403() {
        let response = AuthRejection::Forbidden("nope").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
