//! Shared lifecycle for confirmation artifacts.
//!
//! Email-confirmation links, password-reset links and two-factor codes all
//! run the same machine: issued -> consumed | expired | attempts exhausted.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ConfirmKind, ConfirmToken, User};
use crate::services::{Database, EmailProvider};
use crate::utils::{generate_confirm_token, generate_two_factor_code};

/// Wrong values tolerated before an artifact self-destructs.
pub const CONFIRM_MAX_ATTEMPTS: i32 = 3;

/// An outstanding artifact is only replaced inside its final 30 seconds.
const REISSUE_WINDOW_SECONDS: i64 = 30;

#[derive(Clone)]
pub struct ConfirmService {
    db: Database,
    email: Arc<dyn EmailProvider>,
    frontend_url: String,
}

impl ConfirmService {
    pub fn new(db: Database, email: Arc<dyn EmailProvider>, frontend_url: String) -> Self {
        Self {
            db,
            email,
            frontend_url,
        }
    }

    /// Issue a fresh artifact for (user, kind) and dispatch the matching
    /// email. An outstanding artifact with more than 30 seconds left blocks
    /// the re-issue; one within its final 30 seconds (or expired) is
    /// replaced. If dispatch fails the new artifact is deleted before the
    /// error propagates.
    #[tracing::instrument(skip_all, fields(user_id = %user.id, kind = kind.as_str()))]
    pub async fn issue(
        &self,
        user: &User,
        kind: ConfirmKind,
        ttl: Duration,
    ) -> Result<ConfirmToken, AppError> {
        if let Some(existing) = self.db.find_confirm_token(user.id, kind).await? {
            let remaining = existing.seconds_remaining();
            if remaining > REISSUE_WINDOW_SECONDS {
                return Err(AppError::BadRequest(reissue_message(remaining)));
            }
            self.db.delete_confirm_token(existing.id).await?;
        }

        let value = match kind {
            ConfirmKind::TwoFactorMail => generate_two_factor_code(),
            _ => generate_confirm_token(),
        };

        let artifact = ConfirmToken::new(user.id, kind, value, ttl);
        self.db.insert_confirm_token(&artifact).await?;

        if let Err(e) = self.dispatch(user, kind, &artifact.token).await {
            self.db.delete_confirm_token(artifact.id).await?;
            return Err(e);
        }

        Ok(artifact)
    }

    /// Check a presented value against the live artifact. A match consumes
    /// the artifact; the third mismatch destroys it; observed expiry
    /// destroys it.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, kind = kind.as_str()))]
    pub async fn validate(
        &self,
        user_id: Uuid,
        kind: ConfirmKind,
        presented: &str,
    ) -> Result<(), AppError> {
        let artifact = self
            .db
            .find_confirm_token(user_id, kind)
            .await?
            .ok_or_else(|| AppError::NotFound(kind.not_found_message().to_string()))?;

        if artifact.token != presented {
            let attempts = self.db.increment_confirm_attempts(artifact.id).await?;
            if attempts >= CONFIRM_MAX_ATTEMPTS {
                self.db.delete_confirm_token(artifact.id).await?;
                return Err(AppError::BadRequest(kind.exhausted_message().to_string()));
            }
            return Err(AppError::BadRequest(
                kind.mismatch_message(CONFIRM_MAX_ATTEMPTS - attempts),
            ));
        }

        if artifact.is_expired() {
            self.db.delete_confirm_token(artifact.id).await?;
            return Err(AppError::BadRequest(kind.expired_message().to_string()));
        }

        self.db.delete_confirm_token(artifact.id).await?;
        Ok(())
    }

    async fn dispatch(&self, user: &User, kind: ConfirmKind, value: &str) -> Result<(), AppError> {
        match kind {
            ConfirmKind::Mail => {
                let link = format!(
                    "{}/auth/confirm-email?token={}&email={}",
                    self.frontend_url,
                    value,
                    urlencoding::encode(&user.email)
                );
                self.email.send_confirm_email(&user.email, &link).await
            }
            ConfirmKind::ResetPassword => {
                let link = format!(
                    "{}/auth/reset-password?token={}&email={}",
                    self.frontend_url,
                    value,
                    urlencoding::encode(&user.email)
                );
                self.email.send_password_reset_email(&user.email, &link).await
            }
            ConfirmKind::TwoFactorMail => self.email.send_two_factor_code(&user.email, value).await,
        }
    }
}

fn reissue_message(seconds: i64) -> String {
    format!(
        "Подтверждение почты уже отправлено. Осталось {} минут {} секунд до истечения срока действия",
        seconds / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reissue_message_splits_minutes_and_seconds() {
        assert_eq!(
            reissue_message(271),
            "Подтверждение почты уже отправлено. Осталось 4 минут 31 секунд до истечения срока действия"
        );
        assert_eq!(
            reissue_message(60),
            "Подтверждение почты уже отправлено. Осталось 1 минут 0 секунд до истечения срока действия"
        );
    }
}
