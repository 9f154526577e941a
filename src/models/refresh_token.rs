//! Refresh session model - one row per issued refresh JWT.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Refresh session entity. The token column stores the signed JWT string.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub ip: String,
    pub user_agent: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create a new refresh session.
    pub fn new(
        user_id: Uuid,
        token: String,
        ip: String,
        user_agent: String,
        expiry_days: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            ip,
            user_agent,
            expires_at: Utc::now() + Duration::days(expiry_days),
            created_at: Utc::now(),
        }
    }

    /// Check if the session is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
