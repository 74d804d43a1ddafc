//! Domain layer - Core entities and store contracts

pub mod error;
pub mod prescription;
pub mod user;

pub use error::DomainError;
