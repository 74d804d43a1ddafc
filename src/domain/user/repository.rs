//! User store contract

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserFilter, UserId, UserUpdate};
use crate::domain::DomainError;

/// Repository trait for the external user store
///
/// Lookups that find nothing resolve to `None`, never to an error.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Find a single user by (case-folded) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by id
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    /// Apply a partial update and return the updated record
    async fn update_by_id(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, DomainError>;

    /// Remove a user and return the removed record
    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// List users matching a filter, oldest first
    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<User>, DomainError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
