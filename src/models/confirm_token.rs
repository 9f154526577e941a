//! Confirmation artifact model - mail links, reset links and 2FA codes.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Mail,
    ResetPassword,
    TwoFactorMail,
}

impl ConfirmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmKind::Mail => "MAIL",
            ConfirmKind::ResetPassword => "RESET_PASSWORD",
            ConfirmKind::TwoFactorMail => "TWO_FACTOR_MAIL",
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        "Код не найден"
    }

    pub fn mismatch_message(&self, remaining: i32) -> String {
        match self {
            ConfirmKind::ResetPassword => "Неверный токен".to_string(),
            _ => format!(
                "Неверный код подтверждения. Осталось попыток: {}",
                remaining
            ),
        }
    }

    pub fn exhausted_message(&self) -> &'static str {
        match self {
            ConfirmKind::ResetPassword => "Слишком много попыток. Токен онулирован",
            _ => "Превышено количество попыток",
        }
    }

    pub fn expired_message(&self) -> &'static str {
        match self {
            ConfirmKind::ResetPassword => "Срок действия токена истек",
            _ => "Срок действия кода истек",
        }
    }
}

/// Confirmation artifact entity. Single-use: deleted on success, on
/// exhaustion and on observed expiry.
#[derive(Debug, Clone, FromRow)]
pub struct ConfirmToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub token: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ConfirmToken {
    /// Create a new artifact with a fresh attempt counter.
    pub fn new(user_id: Uuid, kind: ConfirmKind, token: String, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            token,
            attempts: 0,
            expires_at: Utc::now() + ttl,
            created_at: Utc::now(),
        }
    }

    /// Check if the artifact is past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whole seconds left before expiry, zero when already expired.
    pub fn seconds_remaining(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}
