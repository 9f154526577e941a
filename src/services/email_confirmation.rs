//! Email confirmation: link issuance and consumption.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use crate::dtos::ApiResponse;
use crate::error::AppError;
use crate::models::ConfirmKind;
use crate::services::{ConfirmService, Database, UsersService};

#[derive(Clone)]
pub struct EmailConfirmationService {
    db: Database,
    users: UsersService,
    confirm: ConfirmService,
}

impl EmailConfirmationService {
    pub fn new(db: Database, users: UsersService, confirm: ConfirmService) -> Self {
        Self { db, users, confirm }
    }

    /// Mail a confirmation link (valid 15 minutes) to an unconfirmed account.
    /// Also runs when an unconfirmed user tries to sign in.
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn send_confirm_email(&self, email: &str) -> Result<ApiResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Пользователь не найден".to_string()))?;

        if user.email_confirmed {
            return Err(AppError::BadRequest("Почта уже подтверждена".to_string()));
        }

        let artifact = self
            .confirm
            .issue(&user, ConfirmKind::Mail, Duration::minutes(15))
            .await?;

        Ok(ApiResponse::new(
            StatusCode::OK,
            "Вам нужно перейти по ссылке, чтобы подтвердить электронную почту. Ссылка действительна 15 минут. Она уже отправлена на вашу почту",
            json!({
                "id": user.id,
                "email": user.email,
                "mailConfirmCodeExpiresAt": artifact.expires_at,
            }),
        ))
    }

    /// Consume a link token and mark the account confirmed.
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn confirm_email(&self, token: &str, email: &str) -> Result<ApiResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(ConfirmKind::Mail.not_found_message().to_string()))?;

        self.confirm
            .validate(user.id, ConfirmKind::Mail, token)
            .await?;

        self.db.update_user_email_confirmed(user.id, true).await?;

        Ok(ApiResponse::new(
            StatusCode::OK,
            "Email подтвержден",
            json!({ "id": user.id, "email": user.email }),
        ))
    }
}
