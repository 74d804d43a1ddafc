//! Shared API request/response types

pub mod envelope;
pub mod error;
pub mod json;

pub use envelope::{DataResponse, ListResponse};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
