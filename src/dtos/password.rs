use crate::error::AppError;
use crate::utils::validation;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of POST /password-recovery/request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordResetDto {
    #[schema(example = "user@example.com")]
    pub email: String,
}

impl RequestPasswordResetDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_email(&self.email)
    }
}

/// Body of POST /password-recovery/reset.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordDto {
    #[schema(example = "a1b2c3d4e5f6...")]
    pub token: String,

    #[schema(example = "user@example.com")]
    pub email: String,

    #[schema(example = "newpassword123", min_length = 8)]
    pub new_password: String,
}

impl ResetPasswordDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_token(&self.token)?;
        validation::validate_email(&self.email)?;
        validation::validate_password("newPassword", &self.new_password)?;
        Ok(())
    }
}

/// Body of POST /auth/change-password and PUT /password-recovery.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[schema(example = "oldpassword123", min_length = 8)]
    pub old_password: String,

    #[schema(example = "newpassword123", min_length = 8)]
    pub new_password: String,
}

impl ChangePasswordDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_password("oldPassword", &self.old_password)?;
        validation::validate_password("newPassword", &self.new_password)?;
        Ok(())
    }
}
