//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID is not a valid UUID: '{0}'")]
    MalformedId(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email address is not valid: '{0}'")]
    InvalidEmail(String),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Unknown role: '{0}'. Expected one of patient, doctor, admin")]
    UnknownRole(String),
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a user ID
///
/// IDs are UUIDs generated when the record is created.
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    uuid::Uuid::parse_str(id).map_err(|_| UserValidationError::MalformedId(id.to_string()))?;

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address (before normalization)
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !trimmed.validate_email() {
        return Err(UserValidationError::InvalidEmail(trimmed.to_string()));
    }

    Ok(())
}

/// Validate a plaintext password before hashing
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Case-fold an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(validate_user_id(&id).is_ok());
    }

    #[test]
    fn test_invalid_user_id() {
        assert_eq!(validate_user_id(""), Err(UserValidationError::EmptyId));
        assert!(matches!(
            validate_user_id("not-a-uuid"),
            Err(UserValidationError::MalformedId(_))
        ));
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("T").is_ok());
        assert_eq!(validate_name("   "), Err(UserValidationError::EmptyName));
        assert_eq!(
            validate_name(&"x".repeat(101)),
            Err(UserValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("t@e.com").is_ok());
        assert!(validate_email("  Dr.Who@Clinic.org ").is_ok());
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert!(matches!(
            validate_email("no-at-sign"),
            Err(UserValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("p").is_ok());
        assert_eq!(validate_password(""), Err(UserValidationError::EmptyPassword));
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com "), "a@b.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
    }
}
