//! User domain
//!
//! Domain types and the store contract for clinic users (patients, doctors
//! and administrators).

mod entity;
mod repository;
mod validation;
mod view;

pub use entity::{User, UserFilter, UserId, UserRole, UserUpdate};
pub use repository::UserRepository;
pub use validation::{
    normalize_email, validate_email, validate_name, validate_password, validate_user_id,
    UserValidationError,
};
pub use view::UserView;

#[cfg(test)]
pub use repository::mock::MockUserRepository;
