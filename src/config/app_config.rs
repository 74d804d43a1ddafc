use std::ops::RangeInclusive;

use serde::Deserialize;

/// Accepted session cookie lifetimes, in days
pub const COOKIE_EXPIRE_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Application configuration, resolved once at startup
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub environment: Environment,
    pub admin: Option<AdminSeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token and session cookie settings
///
/// Secrets are optional here so startup can tell a configured secret from the
/// built-in fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    /// Access token lifetime, e.g. `30d`, `12h`, `3600`
    pub jwt_expire: String,
    pub jwt_refresh_secret: Option<String>,
    /// Refresh token lifetime
    pub jwt_refresh_expire: String,
    /// Session cookie lifetime in days
    pub cookie_expire_days: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

/// Credentials for an administrator account created at startup if missing
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeedConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    #[default]
    #[serde(alias = "dev")]
    Development,
    Test,
    Staging,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    /// Local environments serve the session cookie without the `Secure` flag
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Development => "development",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "development" | "dev" => Some(Self::Development),
            "test" => Some(Self::Test),
            "staging" => Some(Self::Staging),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expire: "30d".to_string(),
            jwt_refresh_secret: None,
            jwt_refresh_expire: "7d".to_string(),
            cookie_expire_days: 30,
        }
    }
}

impl AuthConfig {
    /// Reject settings that would produce unusable session cookies
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !COOKIE_EXPIRE_DAYS_RANGE.contains(&self.cookie_expire_days) {
            return Err(config::ConfigError::Message(format!(
                "Cookie lifetime must be between {} and {} days, got {}",
                COOKIE_EXPIRE_DAYS_RANGE.start(),
                COOKIE_EXPIRE_DAYS_RANGE.end(),
                self.cookie_expire_days
            )));
        }

        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_env_overrides(|key| std::env::var(key).ok())?;
        app_config.auth.validate()?;

        Ok(app_config)
    }

    /// Honor the flat variable names used by existing deployments
    /// (`JWT_SECRET`, `NODE_ENV`, `DATABASE_URL`, ...)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(v);
        }
        if let Some(v) = lookup("JWT_EXPIRE") {
            self.auth.jwt_expire = v;
        }
        if let Some(v) = lookup("JWT_REFRESH_SECRET") {
            self.auth.jwt_refresh_secret = Some(v);
        }
        if let Some(v) = lookup("JWT_REFRESH_EXPIRE") {
            self.auth.jwt_refresh_expire = v;
        }
        if let Some(v) = lookup("JWT_COOKIE_EXPIRE") {
            self.auth.cookie_expire_days = v.trim().parse().map_err(|_| {
                config::ConfigError::Message(format!("JWT_COOKIE_EXPIRE is not a number: {}", v))
            })?;
            self.auth.validate()?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.trim().parse().map_err(|_| {
                config::ConfigError::Message(format!("PORT is not a valid port: {}", v))
            })?;
        }

        let env_name = lookup("APP_ENV").or_else(|| lookup("NODE_ENV"));
        if let Some(v) = env_name {
            self.environment = Environment::parse(&v).ok_or_else(|| {
                config::ConfigError::Message(format!("Unknown environment: {}", v))
            })?;
        }

        if let (Some(email), Some(password)) = (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            self.admin = Some(AdminSeedConfig {
                name: lookup("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                email,
                password,
            });
        }

        Ok(())
    }
}
