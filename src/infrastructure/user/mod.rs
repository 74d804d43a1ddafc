//! User infrastructure module
//!
//! Argon2 password hashing, the in-memory and PostgreSQL user stores, and the
//! user directory service built on top of them.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{NewUser, UpdateUserRequest, UserDirectory};
