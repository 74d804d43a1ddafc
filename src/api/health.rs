//! Health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Returns 200 while the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        success: true,
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: None,
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Health including a user store probe; 503 when the store is unreachable
pub async fn api_health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let store = check_user_store(&state).await;
    let status = store.status;

    let response = HealthResponse {
        success: status == HealthStatus::Healthy,
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: Some(state.environment.to_string()),
        checks: Some(vec![store]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

async fn check_user_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    match state.users.ping().await {
        Ok(()) => HealthCheck {
            name: "user_store".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => HealthCheck {
            name: "user_store".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
    }
}
