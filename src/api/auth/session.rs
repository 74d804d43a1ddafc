//! Token response finisher
//!
//! Every successful register/login/refresh ends here: a fresh access and
//! refresh token pair is issued, the access token is planted in an HTTP-only
//! `token` cookie, and a sanitized view of the user is returned alongside the
//! raw tokens.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::types::{ApiError, Json};
use crate::config::Environment;
use crate::domain::user::{User, UserView};
use crate::infrastructure::auth::TokenIssuer;

/// Name of the session cookie carrying the access token
pub const TOKEN_COOKIE: &str = "token";

const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Attributes of the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookie {
    pub expire_days: i64,
    pub secure: bool,
}

impl SessionCookie {
    /// `Secure` is only set outside local environments
    pub fn new(expire_days: i64, environment: Environment) -> Self {
        Self {
            expire_days,
            secure: !environment.is_local(),
        }
    }

    pub fn build(&self, token: &str) -> Result<String, ApiError> {
        self.build_at(token, Utc::now())
    }

    fn build_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, ApiError> {
        let expires = Duration::try_days(self.expire_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                ApiError::internal(format!(
                    "Session cookie lifetime of {} days is out of range",
                    self.expire_days
                ))
            })?;

        Ok(self.format(token, expires))
    }

    /// Cookie that overwrites the session and expires immediately
    pub fn cleared(&self) -> String {
        self.format("none", DateTime::<Utc>::UNIX_EPOCH)
    }

    fn format(&self, value: &str, expires: DateTime<Utc>) -> String {
        let mut cookie = format!(
            "{}={}; Expires={}; Path=/; HttpOnly",
            TOKEN_COOKIE,
            value,
            expires.format(COOKIE_DATE_FORMAT)
        );

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie.push_str("; SameSite=Strict");
        cookie
    }
}

/// Body of a successful authentication response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub data: UserView,
}

/// Issue a token pair for `user` and finish the response with the session
/// cookie and sanitized user body
pub fn send_token_response(
    user: &User,
    status: StatusCode,
    issuer: &TokenIssuer,
    cookie: &SessionCookie,
) -> Result<Response, ApiError> {
    let token = issuer.issue_access_token(user.id())?;
    let refresh_token = issuer.issue_refresh_token(user.id())?;

    let set_cookie = HeaderValue::from_str(&cookie.build(&token)?)
        .map_err(|e| ApiError::internal(format!("Invalid session cookie: {}", e)))?;

    let body = TokenResponse {
        success: true,
        token,
        refresh_token,
        data: UserView::from(user),
    };

    Ok((status, [(header::SET_COOKIE, set_cookie)], Json(body)).into_response())
}
