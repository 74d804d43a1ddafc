//! Password hashing with Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Hashes passwords before they reach the user store
pub trait PasswordHasher: Send + Sync + Debug {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Constant-time check of a password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();

        let hash = hasher.hash("p").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("p", &hash));
        assert!(!hasher.verify("P", &hash));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let hasher = Argon2Hasher::new();

        let first = hasher.hash("session-password").unwrap();
        let second = hasher.hash("session-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("session-password", &second));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = Argon2Hasher::new();

        assert!(!hasher.verify("p", "plaintext-not-a-hash"));
        assert!(!hasher.verify("p", ""));
    }
}
