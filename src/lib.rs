//! Telepsych API
//!
//! Backend for a tele-psychiatry service:
//! - Access and refresh JWT issuance with an HTTP-only session cookie
//! - User directory over PostgreSQL or an in-memory store
//! - Mock prescription management

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::auth::session::SessionCookie;
use api::state::AppState;
use crate::config::{AdminSeedConfig, Environment};
use domain::user::{UserRepository, UserRole};
use infrastructure::{
    auth::{TokenConfig, TokenIssuer},
    prescription::InMemoryPrescriptionRepository,
    user::{Argon2Hasher, InMemoryUserRepository, NewUser, PostgresUserRepository, UserDirectory},
};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create the application state from resolved configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.auth.validate()?;
    let token_config = TokenConfig::try_from(&config.auth)?;
    warn_on_default_secrets(&token_config, config.environment);

    let repository = create_user_repository(config).await?;
    let users = UserDirectory::new(repository, Arc::new(Argon2Hasher::new()));

    if let Some(admin) = &config.admin {
        ensure_admin_user(&users, admin).await?;
    }

    info!(environment = %config.environment, "Application state initialized");

    Ok(AppState::new(
        users,
        TokenIssuer::new(&token_config),
        Arc::new(InMemoryPrescriptionRepository::seeded()),
        SessionCookie::new(config.auth.cookie_expire_days, config.environment),
        config.environment,
    ))
}

async fn create_user_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("No database URL configured; users are held in memory and lost on restart");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    };

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(
            config
                .database
                .max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        )
        .connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
    info!("PostgreSQL connection established");

    let repository = PostgresUserRepository::new(pool);
    repository.ensure_schema().await?;

    Ok(Arc::new(repository))
}

fn warn_on_default_secrets(config: &TokenConfig, environment: Environment) {
    if environment.is_local() {
        return;
    }

    if config.access.default_secret {
        warn!(%environment, "JWT_SECRET is not set; access tokens are signed with the built-in default secret");
    }

    if config.refresh.default_secret {
        warn!(%environment, "JWT_REFRESH_SECRET is not set; refresh tokens are signed with the built-in default secret");
    }
}

/// Create the configured administrator unless an account with that email exists
async fn ensure_admin_user(users: &UserDirectory, admin: &AdminSeedConfig) -> anyhow::Result<()> {
    if users.get_user_by_email(&admin.email).await?.is_some() {
        return Ok(());
    }

    let user = users
        .create_user(NewUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            role: UserRole::Admin,
        })
        .await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("Email: {}", user.email());
    info!("Password: (set via ADMIN_PASSWORD)");
    info!("===========================================");

    Ok(())
}
