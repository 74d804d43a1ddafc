use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{logging_middleware, security_headers_middleware};
use super::prescriptions;
use super::state::AppState;
use super::users;

/// Full API router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/api/health", get(health::api_health_check))
        .nest("/api/auth", auth::create_auth_router())
        .nest("/api/users", users::create_users_router())
        .nest("/api/prescriptions", prescriptions::create_prescriptions_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}
