//! Sanitized, serializable projection of a user

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{User, UserRole};

/// Public view of a [`User`]; carries no password field at all
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}
