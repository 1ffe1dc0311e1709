//! Top-level router: every area mounted under its prefix, plus the
//! tower-http stack (request ids, tracing, timeout, CORS).

use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::auth::auth_routes;
use super::catalog::catalog_routes;
use super::clients::client_routes;
use super::groups::group_routes;
use super::leads::lead_routes;
use super::middleware::auth_middleware;
use super::projects::{project_admin_routes, respondent_routes};
use super::public::public_routes;
use super::state::AppState;

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed browser origins; empty disables cross-origin access.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the application router.
///
/// # Layout
///
/// - `/health`
/// - `/public/...` - anonymous intake
/// - `/auth/...` - login and logout
/// - `/admin/...` - catalog, clients, projects, leads, groups
/// - `/respondent/...` - respondent workspace
pub fn build_router(state: AppState, settings: &HttpSettings) -> Router {
    let admin = catalog_routes()
        .merge(client_routes())
        .merge(project_admin_routes())
        .merge(lead_routes())
        .merge(group_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/public", public_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin)
        .nest("/respondent", respondent_routes())
        .layer(from_fn_with_state(state.validator.clone(), auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(settings.request_timeout))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&settings.cors_origins)),
        )
        .with_state(state)
}
