//! Authentication API endpoints
//!
//! Register, login, refresh, current-user and logout. Successful credential
//! checks are finished by [`session::send_token_response`].

pub mod session;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse, Json};
use crate::domain::user::{UserRole, UserView};
use crate::infrastructure::user::NewUser;

use session::send_token_response;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(get_current_user))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Create an account and start a session
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let role = request.role.unwrap_or_default();

    if role == UserRole::Admin {
        return Err(ApiError::forbidden("Administrator accounts cannot self-register"));
    }

    let user = state
        .users
        .create_user(NewUser {
            name: request.name,
            email: request.email,
            password: request.password,
            role,
        })
        .await?;

    send_token_response(&user, StatusCode::CREATED, &state.tokens, &state.cookie)
}

/// Exchange email and password for a session
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Please provide an email and password"));
    }

    let user = state
        .users
        .authenticate(&request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    info!(user_id = %user.id(), "User logged in");

    send_token_response(&user, StatusCode::OK, &state.tokens, &state.cookie)
}

/// Trade a refresh token for a new token pair
///
/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Response, ApiError> {
    let claims = state
        .tokens
        .verify_refresh_token(&request.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let user = state
        .users
        .get_user_by_id(claims.user_id())
        .await?
        .filter(|user| user.is_active())
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    send_token_response(&user, StatusCode::OK, &state.tokens, &state.cookie)
}

/// GET /api/auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<DataResponse<UserView>>, ApiError> {
    Ok(Json(DataResponse::new(UserView::from(&user))))
}

/// Overwrite the session cookie. Tokens are stateless, so nothing is revoked.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cleared = HeaderValue::from_str(&state.cookie.cleared())
        .map_err(|e| ApiError::internal(format!("Invalid session cookie: {}", e)))?;

    Ok((
        [(header::SET_COOKIE, cleared)],
        Json(DataResponse::new(serde_json::json!({}))),
    )
        .into_response())
}
