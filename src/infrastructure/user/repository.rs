//! In-memory user store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{normalize_email, User, UserFilter, UserId, UserRepository, UserUpdate};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Case-folded email -> user ID
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut email_map = HashMap::new();

        for user in users {
            let id = user.id().as_str().to_string();
            email_map.insert(user.email().to_string(), id.clone());
            users_map.insert(id, user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            email_index: Arc::new(RwLock::new(email_map)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        // Writers lock `users` before `email_index`; never hold the index while waiting on users
        let user_id = self
            .email_index
            .read()
            .await
            .get(&normalize_email(email))
            .cloned();

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                user.email()
            )));
        }

        email_index.insert(user.email().to_string(), id.clone());
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let Some(user) = users.get_mut(id.as_str()) else {
            return Ok(None);
        };

        let old_email = user.email().to_string();

        if let Some(email) = &update.email {
            let new_email = normalize_email(email);

            if new_email != old_email && email_index.contains_key(&new_email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    new_email
                )));
            }
        }

        user.apply(update);

        if user.email() != old_email {
            email_index.remove(&old_email);
            email_index.insert(user.email().to_string(), id.as_str().to_string());
        }

        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let removed = users.remove(id.as_str());

        if let Some(user) = &removed {
            email_index.remove(user.email());
        }

        Ok(removed)
    }

    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();

        result.sort_by_key(|u| u.created_at());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    fn create_test_user(email: &str, role: UserRole) -> User {
        User::new("Test", email, "hashed_password", role)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("t@e.com", UserRole::Patient);

        repo.insert(user.clone()).await.unwrap();

        let by_id = repo.find_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(by_id.email(), "t@e.com");

        let by_email = repo.find_by_email("t@e.com").await.unwrap().unwrap();
        assert_eq!(by_email.id(), user.id());
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("a@b.com", UserRole::Patient);
        repo.insert(user.clone()).await.unwrap();

        let upper = repo.find_by_email("A@B.com").await.unwrap().unwrap();
        let lower = repo.find_by_email("a@b.com").await.unwrap().unwrap();

        assert_eq!(upper.id(), user.id());
        assert_eq!(lower.id(), user.id());
    }

    #[tokio::test]
    async fn test_missing_lookups_are_none() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.find_by_email("nobody@e.com").await.unwrap().is_none());
        assert!(repo.find_by_id(&UserId::generate()).await.unwrap().is_none());
        assert!(repo
            .update_by_id(&UserId::generate(), &UserUpdate::active(false))
            .await
            .unwrap()
            .is_none());
        assert!(repo.delete_by_id(&UserId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryUserRepository::new();

        repo.insert(create_test_user("dup@e.com", UserRole::Patient))
            .await
            .unwrap();

        let result = repo
            .insert(create_test_user("DUP@e.com", UserRole::Doctor))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_reindexes_email() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("old@e.com", UserRole::Patient);
        repo.insert(user.clone()).await.unwrap();

        let update = UserUpdate {
            email: Some("New@E.com".to_string()),
            ..Default::default()
        };
        let updated = repo.update_by_id(user.id(), &update).await.unwrap().unwrap();
        assert_eq!(updated.email(), "new@e.com");

        assert!(repo.find_by_email("old@e.com").await.unwrap().is_none());
        assert!(repo.find_by_email("new@e.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let repo = InMemoryUserRepository::new();
        let first = create_test_user("one@e.com", UserRole::Patient);
        let second = create_test_user("two@e.com", UserRole::Patient);
        repo.insert(first.clone()).await.unwrap();
        repo.insert(second.clone()).await.unwrap();

        let update = UserUpdate {
            email: Some("one@e.com".to_string()),
            ..Default::default()
        };
        let result = repo.update_by_id(second.id(), &update).await;
        assert!(result.is_err());

        let unchanged = repo.find_by_id(second.id()).await.unwrap().unwrap();
        assert_eq!(unchanged.email(), "two@e.com");
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("gone@e.com", UserRole::Doctor);
        repo.insert(user.clone()).await.unwrap();

        let deleted = repo.delete_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(deleted.id(), user.id());

        assert!(repo.find_by_id(user.id()).await.unwrap().is_none());
        assert!(repo.find_by_email("gone@e.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_many_filters() {
        let doctor = create_test_user("doc@e.com", UserRole::Doctor);
        let patient = create_test_user("pat@e.com", UserRole::Patient);
        let retired = create_test_user("old@e.com", UserRole::Doctor).with_active(false);
        let repo = InMemoryUserRepository::with_users(vec![doctor, patient, retired]);

        assert_eq!(repo.find_many(&UserFilter::default()).await.unwrap().len(), 3);
        assert_eq!(repo.find_many(&UserFilter::active()).await.unwrap().len(), 2);

        let doctors = repo
            .find_many(&UserFilter::active_with_role(UserRole::Doctor))
            .await
            .unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].email(), "doc@e.com");
    }
}
