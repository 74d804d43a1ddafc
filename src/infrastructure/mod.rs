//! Infrastructure layer - Token signing, stores and logging

pub mod auth;
pub mod logging;
pub mod prescription;
pub mod user;
