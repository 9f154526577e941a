//! PostgreSQL database service.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{ConfirmKind, ConfirmToken, RefreshToken, User};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect a pool sized from config and wrap it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Apply pending migrations from ./migrations.
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!("migrations failed: {e}"))?;
        tracing::info!("Database schema up to date");
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Find user by ID.
    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Find user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Find user by phone.
    pub async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Find user by the full-name triple. A missing surname only matches
    /// rows where surname is NULL.
    pub async fn find_user_by_full_name(
        &self,
        first_name: &str,
        last_name: &str,
        surname: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE first_name = $1 AND last_name = $2 AND surname IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(surname)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a new user.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, phone, password_hash, first_name, last_name, surname,
                date_of_birth, gender, roles, email_confirmed, two_factor_mail_enabled,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.surname)
        .bind(user.date_of_birth)
        .bind(&user.gender)
        .bind(&user.roles)
        .bind(user.email_confirmed)
        .bind(user.two_factor_mail_enabled)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Update user password hash.
    pub async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update user email confirmed status.
    pub async fn update_user_email_confirmed(
        &self,
        user_id: Uuid,
        confirmed: bool,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET email_confirmed = $1, updated_at = now() WHERE id = $2")
            .bind(confirmed)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Count all users.
    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// List one page of users.
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // ==================== Refresh Token Operations ====================

    /// Find a persisted refresh session for (user, token).
    pub async fn find_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<RefreshToken>, AppError> {
        let session = sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE user_id = $1 AND token = $2",
        )
        .bind(user_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Insert a new refresh session.
    pub async fn insert_refresh_token(&self, session: &RefreshToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token, ip, user_agent, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(&session.ip)
        .bind(&session.user_agent)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Evict sessions matching the caller's ip or user-agent.
    pub async fn delete_refresh_tokens_by_client(
        &self,
        user_id: Uuid,
        ip: &str,
        user_agent: &str,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1 AND (ip = $2 OR user_agent = $3)")
            .bind(user_id)
            .bind(ip)
            .bind(user_agent)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Evict sessions that have already expired.
    pub async fn delete_expired_refresh_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1 AND expires_at < now()")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete sessions carrying the given token string. Returns the number
    /// of deleted rows.
    pub async fn delete_refresh_tokens_by_token(&self, token: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete one session by ID.
    pub async fn delete_refresh_token_by_id(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Confirm Token Operations ====================

    /// Find the live artifact for (user, kind).
    pub async fn find_confirm_token(
        &self,
        user_id: Uuid,
        kind: ConfirmKind,
    ) -> Result<Option<ConfirmToken>, AppError> {
        let artifact = sqlx::query_as::<_, ConfirmToken>(
            "SELECT * FROM confirm_tokens WHERE user_id = $1 AND kind = $2",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(artifact)
    }

    /// Insert a new artifact.
    pub async fn insert_confirm_token(&self, artifact: &ConfirmToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO confirm_tokens (id, user_id, kind, token, attempts, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(artifact.id)
        .bind(artifact.user_id)
        .bind(&artifact.kind)
        .bind(&artifact.token)
        .bind(artifact.attempts)
        .bind(artifact.expires_at)
        .bind(artifact.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete one artifact by ID.
    pub async fn delete_confirm_token(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM confirm_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Increment the attempt counter and return the new value.
    pub async fn increment_confirm_attempts(&self, id: Uuid) -> Result<i32, AppError> {
        let attempts = sqlx::query_scalar::<_, i32>(
            "UPDATE confirm_tokens SET attempts = attempts + 1 WHERE id = $1 RETURNING attempts",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempts)
    }
}
