//! User administration endpoints (admin only)

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse, Json, ListResponse};
use crate::domain::user::{User, UserRole, UserValidationError, UserView};
use crate::infrastructure::user::UpdateUserRequest;

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/activate", patch(activate_user))
        .route("/{id}/deactivate", patch(deactivate_user))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserBody> for UpdateUserRequest {
    fn from(body: UpdateUserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
            is_active: body.is_active,
        }
    }
}

type UserResponse = Result<Json<DataResponse<UserView>>, ApiError>;

fn found(user: Option<User>, id: &str) -> UserResponse {
    user.map(|u| Json(DataResponse::new(UserView::from(&u))))
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", id)))
}

/// GET /api/users?role=doctor
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    query: Result<Query<UserListQuery>, QueryRejection>,
) -> Result<Json<ListResponse<UserView>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let users = match query.role.as_deref() {
        Some(role) => {
            let role: UserRole = role
                .parse()
                .map_err(|e: UserValidationError| ApiError::bad_request(e.to_string()))?;
            state.users.get_users_by_role(role).await?
        }
        None => state.users.get_all_users().await?,
    };

    Ok(Json(ListResponse::new(
        users.iter().map(UserView::from).collect(),
    )))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> UserResponse {
    found(state.users.get_user_by_id(&id).await?, &id)
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> UserResponse {
    let updated = state.users.update_user(&id, body.into()).await?;

    if updated.is_some() {
        info!(admin_id = %admin.id(), user_id = %id, "User updated by admin");
    }

    found(updated, &id)
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> UserResponse {
    let deleted = state.users.delete_user(&id).await?;

    if deleted.is_some() {
        info!(admin_id = %admin.id(), user_id = %id, "User deleted by admin");
    }

    found(deleted, &id)
}

/// PATCH /api/users/{id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> UserResponse {
    found(state.users.activate_user(&id).await?, &id)
}

/// PATCH /api/users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> UserResponse {
    found(state.users.deactivate_user(&id).await?, &id)
}
