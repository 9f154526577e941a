//! Mail-based two-factor codes for sign-in.

use axum::http::StatusCode;
use chrono::Duration;

use crate::dtos::ApiResponse;
use crate::error::AppError;
use crate::models::{ConfirmKind, User};
use crate::services::ConfirmService;

#[derive(Clone)]
pub struct TwoFactorService {
    confirm: ConfirmService,
}

impl TwoFactorService {
    pub fn new(confirm: ConfirmService) -> Self {
        Self { confirm }
    }

    /// Mail a 6-digit code (valid 5 minutes).
    #[tracing::instrument(skip_all, fields(user_id = %user.id))]
    pub async fn send_code(&self, user: &User) -> Result<ApiResponse, AppError> {
        self.confirm
            .issue(user, ConfirmKind::TwoFactorMail, Duration::minutes(5))
            .await?;

        Ok(ApiResponse::message(StatusCode::CREATED, "Код отправлен"))
    }

    /// Check a presented code; success consumes it.
    pub async fn validate_code(&self, user: &User, code: &str) -> Result<(), AppError> {
        self.confirm
            .validate(user.id, ConfirmKind::TwoFactorMail, code)
            .await
    }
}
