//! User directory: pass-through operations over the user store

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_email, validate_name, validate_password, User, UserFilter, UserId, UserRepository,
    UserRole, UserUpdate,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Partial update with a plaintext password, hashed before it reaches the store
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Stateless accessor over the external user store
#[derive(Debug, Clone)]
pub struct UserDirectory {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserDirectory {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Case-insensitive lookup by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository.find_by_email(email).await
    }

    /// Lookup by id; malformed ids are treated as absent
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        match UserId::new(id) {
            Ok(user_id) => self.repository.find_by_id(&user_id).await,
            Err(_) => Ok(None),
        }
    }

    pub async fn create_user(&self, request: NewUser) -> Result<User, DomainError> {
        validate_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(&request.name, &request.email, password_hash, request.role);

        let user = self.repository.insert(user).await?;
        info!(user_id = %user.id(), role = %user.role(), "User created");

        Ok(user)
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<Option<User>, DomainError> {
        let Ok(user_id) = UserId::new(id) else {
            return Ok(None);
        };

        if let Some(name) = &request.name {
            validate_name(name).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(email) = &request.email {
            validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let password_hash = match &request.password {
            Some(password) => {
                validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        let update = UserUpdate {
            name: request.name,
            email: request.email,
            password_hash,
            role: request.role,
            is_active: request.is_active,
        };

        if update.is_empty() {
            return self.repository.find_by_id(&user_id).await;
        }

        debug!(user_id = %user_id, "Updating user");
        self.repository.update_by_id(&user_id, &update).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        let Ok(user_id) = UserId::new(id) else {
            return Ok(None);
        };

        let deleted = self.repository.delete_by_id(&user_id).await?;

        if deleted.is_some() {
            info!(user_id = %user_id, "User deleted");
        }

        Ok(deleted)
    }

    /// Active users with the given role
    pub async fn get_users_by_role(&self, role: UserRole) -> Result<Vec<User>, DomainError> {
        self.repository
            .find_many(&UserFilter::active_with_role(role))
            .await
    }

    /// All active users
    pub async fn get_all_users(&self) -> Result<Vec<User>, DomainError> {
        self.repository.find_many(&UserFilter::active()).await
    }

    pub async fn deactivate_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        self.set_active(id, false).await
    }

    pub async fn activate_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        self.set_active(id, true).await
    }

    /// Check credentials; unknown email, inactive account and wrong password
    /// all resolve to `None`
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            return Ok(None);
        };

        if !user.is_active() {
            debug!(user_id = %user.id(), "Login attempt for inactive user");
            return Ok(None);
        }

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Probe the underlying store
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<User>, DomainError> {
        let Ok(user_id) = UserId::new(id) else {
            return Ok(None);
        };

        let user = self
            .repository
            .update_by_id(&user_id, &UserUpdate::active(is_active))
            .await?;

        if user.is_some() {
            info!(user_id = %user_id, is_active, "User activation changed");
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn create_directory() -> UserDirectory {
        UserDirectory::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        )
    }

    fn new_user(name: &str, email: &str, role: UserRole) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "p".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let directory = create_directory();

        let user = directory
            .create_user(new_user("T", "t@e.com", UserRole::Patient))
            .await
            .unwrap();

        assert_eq!(user.name(), "T");
        assert_eq!(user.email(), "t@e.com");
        assert_eq!(user.role(), UserRole::Patient);
        assert!(user.is_active());
        assert_ne!(user.password_hash(), "p");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let directory = create_directory();

        let mut request = new_user("", "t@e.com", UserRole::Patient);
        assert!(directory.create_user(request.clone()).await.is_err());

        request.name = "T".to_string();
        request.email = "not-an-email".to_string();
        assert!(directory.create_user(request.clone()).await.is_err());

        request.email = "t@e.com".to_string();
        request.password = String::new();
        assert!(directory.create_user(request).await.is_err());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let directory = create_directory();

        directory
            .create_user(new_user("A", "same@e.com", UserRole::Patient))
            .await
            .unwrap();

        let result = directory
            .create_user(new_user("B", "Same@E.com", UserRole::Doctor))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_get_user_by_email_case_insensitive() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("A", "A@B.com", UserRole::Patient))
            .await
            .unwrap();

        let upper = directory.get_user_by_email("A@B.com").await.unwrap().unwrap();
        let lower = directory.get_user_by_email("a@b.com").await.unwrap().unwrap();

        assert_eq!(upper.id(), created.id());
        assert_eq!(lower.id(), created.id());
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("A", "a@b.com", UserRole::Patient))
            .await
            .unwrap();

        let found = directory
            .get_user_by_id(created.id().as_str())
            .await
            .unwrap();
        assert!(found.is_some());

        assert!(directory.get_user_by_id("garbage").await.unwrap().is_none());
        assert!(directory
            .get_user_by_id(UserId::generate().as_str())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("Before", "a@b.com", UserRole::Patient))
            .await
            .unwrap();

        let updated = directory
            .update_user(
                created.id().as_str(),
                UpdateUserRequest {
                    name: Some("After".to_string()),
                    password: Some("new-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name(), "After");
        assert_eq!(updated.email(), "a@b.com");
        assert_eq!(updated.role(), UserRole::Patient);

        assert!(directory
            .authenticate("a@b.com", "new-password")
            .await
            .unwrap()
            .is_some());
        assert!(directory.authenticate("a@b.com", "p").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_update_leaves_record_untouched() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("Same", "same@b.com", UserRole::Doctor))
            .await
            .unwrap();

        let result = directory
            .update_user(created.id().as_str(), UpdateUserRequest::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.name(), "Same");
        assert_eq!(result.updated_at(), created.updated_at());
    }

    #[tokio::test]
    async fn test_update_missing_user_is_none() {
        let directory = create_directory();

        let result = directory
            .update_user(UserId::generate().as_str(), UpdateUserRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("A", "a@b.com", UserRole::Patient))
            .await
            .unwrap();

        let deleted = directory.delete_user(created.id().as_str()).await.unwrap();
        assert!(deleted.is_some());

        let again = directory.delete_user(created.id().as_str()).await.unwrap();
        assert!(again.is_none());
        assert!(directory.get_user_by_email("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_and_activate_visibility() {
        let directory = create_directory();
        let doctor = directory
            .create_user(new_user("Dr", "dr@e.com", UserRole::Doctor))
            .await
            .unwrap();
        directory
            .create_user(new_user("Pat", "pat@e.com", UserRole::Patient))
            .await
            .unwrap();

        assert_eq!(directory.get_all_users().await.unwrap().len(), 2);
        assert_eq!(
            directory.get_users_by_role(UserRole::Doctor).await.unwrap().len(),
            1
        );

        let deactivated = directory
            .deactivate_user(doctor.id().as_str())
            .await
            .unwrap()
            .unwrap();
        assert!(!deactivated.is_active());

        let all = directory.get_all_users().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.iter().all(|u| u.id() != doctor.id()));
        assert!(directory
            .get_users_by_role(UserRole::Doctor)
            .await
            .unwrap()
            .is_empty());

        directory.activate_user(doctor.id().as_str()).await.unwrap();

        assert_eq!(directory.get_all_users().await.unwrap().len(), 2);
        assert_eq!(
            directory.get_users_by_role(UserRole::Doctor).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_authenticate() {
        let directory = create_directory();
        let created = directory
            .create_user(new_user("A", "a@b.com", UserRole::Patient))
            .await
            .unwrap();

        let user = directory.authenticate("A@B.COM", "p").await.unwrap();
        assert_eq!(user.unwrap().id(), created.id());

        assert!(directory.authenticate("a@b.com", "wrong").await.unwrap().is_none());
        assert!(directory.authenticate("x@b.com", "p").await.unwrap().is_none());

        directory.deactivate_user(created.id().as_str()).await.unwrap();
        assert!(directory.authenticate("a@b.com", "p").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let repository = Arc::new(MockUserRepository::new());
        let directory = UserDirectory::new(repository.clone(), Arc::new(Argon2Hasher::new()));

        repository.set_should_fail(true).await;

        assert!(directory.get_user_by_email("a@b.com").await.is_err());
        assert!(directory.get_all_users().await.is_err());
        assert!(directory.ping().await.is_err());
    }
}
