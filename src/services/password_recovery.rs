//! Password recovery by mailed reset link, plus authenticated password change.

use axum::http::StatusCode;
use chrono::Duration;
use uuid::Uuid;

use crate::dtos::{ApiResponse, ChangePasswordDto, ResetPasswordDto};
use crate::error::AppError;
use crate::models::ConfirmKind;
use crate::services::{ConfirmService, Database, UsersService};
use crate::utils::Password;

#[derive(Clone)]
pub struct PasswordRecoveryService {
    db: Database,
    users: UsersService,
    confirm: ConfirmService,
}

impl PasswordRecoveryService {
    pub fn new(db: Database, users: UsersService, confirm: ConfirmService) -> Self {
        Self { db, users, confirm }
    }

    /// Mail a reset link (valid 10 minutes) to an existing account.
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn request_reset(&self, email: &str) -> Result<ApiResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Такой пользователь не найден".to_string()))?;

        self.confirm
            .issue(&user, ConfirmKind::ResetPassword, Duration::minutes(10))
            .await?;

        Ok(ApiResponse::message(
            StatusCode::OK,
            "Письмо с кодом подтверждения отправлено",
        ))
    }

    /// Consume a reset token and store the new password.
    #[tracing::instrument(skip_all, fields(email = %dto.email))]
    pub async fn reset_password(&self, dto: &ResetPasswordDto) -> Result<ApiResponse, AppError> {
        let user = self.users.find_by_email(&dto.email).await?.ok_or_else(|| {
            AppError::NotFound(ConfirmKind::ResetPassword.not_found_message().to_string())
        })?;

        self.confirm
            .validate(user.id, ConfirmKind::ResetPassword, &dto.token)
            .await?;

        let hash = Password::new(dto.new_password.as_str()).hash()?;
        self.db.update_user_password(user.id, &hash).await?;

        Ok(ApiResponse::message(StatusCode::OK, "Пароль успешно изменен"))
    }

    /// Change the password of the authenticated account after re-checking
    /// the old one.
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        dto: &ChangePasswordDto,
    ) -> Result<ApiResponse, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Пользователь не найден".to_string()))?;

        if !Password::new(dto.old_password.as_str()).matches(&user.password_hash)? {
            return Err(AppError::BadRequest("Неверный пароль".to_string()));
        }

        let hash = Password::new(dto.new_password.as_str()).hash()?;
        self.db.update_user_password(user.id, &hash).await?;

        Ok(ApiResponse::message(StatusCode::OK, "Пароль успешно изменен"))
    }
}
