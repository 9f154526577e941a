use crate::error::AppError;
use crate::utils::validation;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithEmailDto {
    #[schema(example = "user@example.com")]
    pub email: String,

    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    /// 6-digit mail code, expected once two-factor auth is enabled.
    #[schema(example = "123456")]
    pub two_factor_mail_auth_code: Option<String>,
}

impl SignInWithEmailDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_email(&self.email)?;
        validation::validate_password("password", &self.password)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithPhoneDto {
    #[schema(example = "+79991234567")]
    pub phone: String,

    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    #[schema(example = "123456")]
    pub two_factor_mail_auth_code: Option<String>,
}

impl SignInWithPhoneDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_phone(&self.phone)?;
        validation::validate_password("password", &self.password)?;
        Ok(())
    }
}

/// Body of POST /email-confirmation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailDto {
    #[schema(example = "a1b2c3d4e5f6...")]
    pub token: String,

    #[schema(example = "user@example.com")]
    pub email: String,
}

impl ConfirmEmailDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_token(&self.token)?;
        validation::validate_email(&self.email)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConfirmEmailQuery {
    pub token: String,
    pub email: String,
}
