//! User authentication extractors using JWT access tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::auth::session::TOKEN_COOKIE;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Extractor that requires a valid access token
///
/// The token is read from:
/// - Authorization header: `Bearer <jwt_token>`
/// - the `token` session cookie
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)?;

        debug!("Validating access token");

        let claims = state
            .tokens
            .verify_access_token(&token)
            .map_err(|_| ApiError::unauthorized("Not authorized to access this route"))?;

        let user = state
            .users
            .get_user_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        if !user.is_active() {
            return Err(ApiError::unauthorized("User account is deactivated"));
        }

        Ok(RequireUser(user))
    }
}

/// Extractor that requires an authenticated administrator
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            debug!(user_id = %user.id(), role = %user.role(), "Admin route refused");
            return Err(ApiError::forbidden(format!(
                "User role '{}' is not authorized to access this route",
                user.role()
            )));
        }

        Ok(RequireAdmin(user))
    }
}

/// Pull the access token from the bearer header, falling back to the session cookie
pub fn extract_access_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    if let Some(token) = cookie_token(headers) {
        return Ok(token);
    }

    Err(ApiError::unauthorized(
        "Not authorized to access this route. Provide 'Authorization: Bearer <token>' or the session cookie",
    ))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        let result = extract_access_token(&headers);
        assert_eq!(result.unwrap(), "eyJhbGciOiJIUzI1NiJ9.test");
    }

    #[test]
    fn test_extract_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; token=abc.def.ghi".parse().unwrap());

        let result = extract_access_token(&headers);
        assert_eq!(result.unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        headers.insert(header::COOKIE, "token=from-cookie".parse().unwrap());

        assert_eq!(extract_access_token(&headers).unwrap(), "from-header");
    }

    #[test]
    fn test_cleared_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "token=none".parse().unwrap());

        let err = extract_access_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();

        let err = extract_access_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_access_token(&headers).is_err());
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        assert_eq!(extract_access_token(&headers).unwrap(), "token-with-spaces");
    }
}
