//! PostgreSQL user store

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{normalize_email, User, UserFilter, UserId, UserRepository, UserRole, UserUpdate};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'patient',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.name())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(user.role().as_str())
        .bind(user.is_active())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user, "create"))?;

        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.email.as_deref().map(normalize_email))
        .bind(update.password_hash.as_deref())
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Email is already registered")
            } else {
                DomainError::storage(format!("Failed to update user: {}", e))
            }
        })?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::TEXT IS NULL OR role = $1)
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            ORDER BY created_at
            "#,
            USER_COLUMNS
        ))
        .bind(filter.role.map(|r| r.as_str()))
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn map_write_error(err: sqlx::Error, user: &User, action: &str) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::conflict(format!("Email '{}' is already registered", user.email()))
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, err))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let email: String = row.get("email");
    let password_hash: String = row.get("password_hash");
    let role: String = row.get("role");
    let is_active: bool = row.get("is_active");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let user_id = UserId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role: UserRole = role
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    Ok(User::with_id(user_id, name, &email, password_hash, role)
        .with_active(is_active)
        .with_timestamps(created_at, updated_at))
}
