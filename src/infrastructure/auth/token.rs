//! Access and refresh token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::config::AuthConfig;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Fallback access secret when none is configured
pub const DEFAULT_ACCESS_SECRET: &str = "default_secret";
/// Fallback refresh secret when none is configured
pub const DEFAULT_REFRESH_SECRET: &str = "default_refresh_secret";

/// JWT claims: the user id plus issue/expiry timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    pub id: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(user_id: &UserId, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            id: user_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn user_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Secret and lifetime for one kind of token
#[derive(Clone)]
pub struct SigningConfig {
    pub secret: String,
    pub ttl: Duration,
    /// True when `secret` is the built-in fallback
    pub default_secret: bool,
}

impl Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &"[hidden]")
            .field("ttl", &self.ttl)
            .field("default_secret", &self.default_secret)
            .finish()
    }
}

impl SigningConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            default_secret: false,
        }
    }
}

/// Resolved token settings for both kinds of token
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access: SigningConfig,
    pub refresh: SigningConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access: SigningConfig {
                secret: DEFAULT_ACCESS_SECRET.to_string(),
                ttl: Duration::days(30),
                default_secret: true,
            },
            refresh: SigningConfig {
                secret: DEFAULT_REFRESH_SECRET.to_string(),
                ttl: Duration::days(7),
                default_secret: true,
            },
        }
    }
}

impl TryFrom<&AuthConfig> for TokenConfig {
    type Error = DomainError;

    fn try_from(config: &AuthConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            access: resolve_signing(
                config.jwt_secret.as_deref(),
                DEFAULT_ACCESS_SECRET,
                &config.jwt_expire,
            )?,
            refresh: resolve_signing(
                config.jwt_refresh_secret.as_deref(),
                DEFAULT_REFRESH_SECRET,
                &config.jwt_refresh_expire,
            )?,
        })
    }
}

fn resolve_signing(
    secret: Option<&str>,
    fallback: &str,
    expire: &str,
) -> Result<SigningConfig, DomainError> {
    let ttl = parse_expiry(expire)?;

    Ok(match secret {
        Some(s) if !s.is_empty() => SigningConfig::new(s, ttl),
        _ => SigningConfig {
            secret: fallback.to_string(),
            ttl,
            default_secret: true,
        },
    })
}

/// Parse a token lifetime such as `30d`, `12h`, `15m`, `90s`, `2w` or a bare
/// number of seconds
pub fn parse_expiry(value: &str) -> Result<Duration, DomainError> {
    let value = value.trim();
    let invalid = || DomainError::configuration(format!("Invalid token expiry: '{}'", value));

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: i64 = digits.parse().map_err(|_| invalid())?;

    if amount <= 0 {
        return Err(invalid());
    }

    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    };

    duration.ok_or_else(invalid)
}

struct Signer {
    kind: TokenKind,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Signer {
    fn new(kind: TokenKind, config: &SigningConfig) -> Self {
        Self {
            kind,
            ttl: config.ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    fn issue(&self, user_id: &UserId) -> Result<String, DomainError> {
        let claims = TokenClaims::new(user_id, self.ttl);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            DomainError::internal(format!("Failed to sign {} token: {}", self.kind.label(), e))
        })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let validation = Validation::default();

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| DomainError::token(format!("Invalid {} token: {}", self.kind.label(), e)))?;

        Ok(token_data.claims)
    }
}

/// Issues and verifies the two kinds of bearer token
pub struct TokenIssuer {
    access: Signer,
    refresh: Signer,
}

impl Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: Signer::new(TokenKind::Access, &config.access),
            refresh: Signer::new(TokenKind::Refresh, &config.refresh),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(&TokenConfig::default())
    }

    pub fn issue_access_token(&self, user_id: &UserId) -> Result<String, DomainError> {
        self.access.issue(user_id)
    }

    pub fn issue_refresh_token(&self, user_id: &UserId) -> Result<String, DomainError> {
        self.refresh.issue(user_id)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        self.access.verify(token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        self.refresh.verify(token)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access.ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            access: SigningConfig::new("access-secret-12345", Duration::days(30)),
            refresh: SigningConfig::new("refresh-secret-67890", Duration::days(7)),
        })
    }

    #[test]
    fn test_issue_and_verify_access() {
        let issuer = create_issuer();
        let user_id = UserId::generate();

        let token = issuer.issue_access_token(&user_id).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id(), user_id.as_str());
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn test_issue_and_verify_refresh() {
        let issuer = create_issuer();
        let user_id = UserId::generate();

        let token = issuer.issue_refresh_token(&user_id).unwrap();
        let claims = issuer.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.id, user_id.as_str());
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn test_access_and_refresh_tokens_differ() {
        let issuer = create_issuer();
        let user_id = UserId::generate();

        let access = issuer.issue_access_token(&user_id).unwrap();
        let refresh = issuer.issue_refresh_token(&user_id).unwrap();
        assert_ne!(access, refresh);

        // Each kind only verifies under its own secret
        assert!(issuer.verify_refresh_token(&access).is_err());
        assert!(issuer.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let issuer = create_issuer();
        let err = issuer.verify_access_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, DomainError::Token { .. }));
    }

    #[test]
    fn test_expired_token() {
        let issuer = create_issuer();
        let past = Utc::now() - Duration::hours(2);
        let claims = TokenClaims {
            id: UserId::generate().to_string(),
            iat: (past - Duration::hours(1)).timestamp(),
            exp: past.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret-12345"),
        )
        .unwrap();

        assert!(issuer.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_default_config() {
        let issuer = TokenIssuer::with_default_config();
        assert_eq!(issuer.access_ttl(), Duration::days(30));
        assert_eq!(issuer.refresh_ttl(), Duration::days(7));

        let config = TokenConfig::default();
        assert_eq!(config.access.secret, DEFAULT_ACCESS_SECRET);
        assert!(config.access.default_secret);
    }

    #[test]
    fn test_resolve_from_auth_config() {
        let auth = AuthConfig {
            jwt_secret: Some("configured".to_string()),
            jwt_expire: "12h".to_string(),
            ..Default::default()
        };

        let config = TokenConfig::try_from(&auth).unwrap();
        assert_eq!(config.access.secret, "configured");
        assert!(!config.access.default_secret);
        assert_eq!(config.access.ttl, Duration::hours(12));
        assert_eq!(config.refresh.secret, DEFAULT_REFRESH_SECRET);
        assert!(config.refresh.default_secret);
        assert_eq!(config.refresh.ttl, Duration::days(7));
    }

    #[test]
    fn test_resolve_rejects_bad_expiry() {
        let auth = AuthConfig {
            jwt_refresh_expire: "forever".to_string(),
            ..Default::default()
        };

        assert!(TokenConfig::try_from(&auth).is_err());
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("30d").unwrap(), Duration::days(30));
        assert_eq!(parse_expiry("12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_expiry("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_expiry("90s").unwrap(), Duration::seconds(90));
        assert_eq!(parse_expiry("2w").unwrap(), Duration::weeks(2));
        assert_eq!(parse_expiry("3600").unwrap(), Duration::seconds(3600));
        assert_eq!(parse_expiry(" 7d ").unwrap(), Duration::days(7));

        assert!(parse_expiry("").is_err());
        assert!(parse_expiry("d").is_err());
        assert!(parse_expiry("0d").is_err());
        assert!(parse_expiry("10y").is_err());
    }
}
