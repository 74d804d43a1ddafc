//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{normalize_email, validate_user_id, UserValidationError};

/// User identifier - a UUID v4 rendered as a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a UserId from an existing value after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user within the clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as held by the user store
///
/// No `Serialize` impl: responses go through
/// [`UserView`](super::UserView), which has no password field.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    name: String,
    /// Always stored lowercase
    email: String,
    /// Argon2 PHC string
    password_hash: String,
    role: UserRole,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, active user with a generated id
    pub fn new(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self::with_id(UserId::generate(), name, email, password_hash, role)
    }

    /// Create a new, active user with a known id
    pub fn with_id(
        id: UserId,
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restore the active flag when loading from storage
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Restore timestamps when loading from storage
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Apply a partial update; fields left as `None` are untouched
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }

        if let Some(email) = &update.email {
            self.email = normalize_email(email);
        }

        if let Some(hash) = &update.password_hash {
            self.password_hash = hash.clone();
        }

        if let Some(role) = update.role {
            self.role = role;
        }

        if let Some(active) = update.is_active {
            self.is_active = active;
        }

        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update applied by the store's find-and-update operation
///
/// The password, when present, is already hashed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filter for the store's find-many operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    /// Active users, any role
    pub fn active() -> Self {
        Self {
            role: None,
            is_active: Some(true),
        }
    }

    /// Active users with the given role
    pub fn active_with_role(role: UserRole) -> Self {
        Self {
            role: Some(role),
            is_active: Some(true),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|r| user.role() == r)
            && self.is_active.is_none_or(|a| user.is_active() == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(email: &str, role: UserRole) -> User {
        User::new("Test User", email, "hashed_password", role)
    }

    #[test]
    fn test_user_id_generate_is_valid() {
        let id = UserId::generate();
        assert!(UserId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_user_id_invalid() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("admin").is_err());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("patient".parse::<UserRole>().unwrap(), UserRole::Patient);
        assert_eq!("Doctor".parse::<UserRole>().unwrap(), UserRole::Doctor);
        assert_eq!(" ADMIN ".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("nurse".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::Doctor).unwrap(), "\"doctor\"");
        assert_eq!(UserRole::default(), UserRole::Patient);
    }

    #[test]
    fn test_user_creation_folds_email() {
        let user = create_test_user("Someone@Example.COM", UserRole::Patient);

        assert_eq!(user.email(), "someone@example.com");
        assert_eq!(user.role(), UserRole::Patient);
        assert!(user.is_active());
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut user = create_test_user("a@b.com", UserRole::Patient);
        let original_name = user.name().to_string();

        user.apply(&UserUpdate {
            email: Some("New@B.com".to_string()),
            role: Some(UserRole::Doctor),
            ..Default::default()
        });

        assert_eq!(user.name(), original_name);
        assert_eq!(user.email(), "new@b.com");
        assert_eq!(user.role(), UserRole::Doctor);
        assert_eq!(user.password_hash(), "hashed_password");
    }

    #[test]
    fn test_apply_touches_updated_at() {
        let mut user = create_test_user("a@b.com", UserRole::Patient);
        let original_updated = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        user.apply(&UserUpdate::active(false));
        assert!(!user.is_active());
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());
        assert!(!UserUpdate::active(true).is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let doctor = create_test_user("doc@b.com", UserRole::Doctor);
        let inactive = create_test_user("gone@b.com", UserRole::Doctor).with_active(false);

        assert!(UserFilter::default().matches(&inactive));
        assert!(UserFilter::active().matches(&doctor));
        assert!(!UserFilter::active().matches(&inactive));
        assert!(UserFilter::active_with_role(UserRole::Doctor).matches(&doctor));
        assert!(!UserFilter::active_with_role(UserRole::Patient).matches(&doctor));
    }
}
