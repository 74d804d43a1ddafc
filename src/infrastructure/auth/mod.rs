//! Authentication infrastructure module
//!
//! This module provides JWT access/refresh token management.

mod token;

pub use token::{
    parse_expiry, SigningConfig, TokenClaims, TokenConfig, TokenIssuer, TokenKind,
    DEFAULT_ACCESS_SECRET, DEFAULT_REFRESH_SECRET,
};
