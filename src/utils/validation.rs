//! Field validators for request payloads.
//!
//! DTOs call these from their `validate()` before any handler logic runs.

use crate::error::AppError;
use validator::ValidateEmail;

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if !email.validate_email() {
        return Err(AppError::BadRequest("email must be an email".to_string()));
    }
    Ok(())
}

pub fn validate_password(field: &str, password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::BadRequest(format!(
            "{} must be longer than or equal to 8 characters",
            field
        )));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!(
            "{} should not be empty",
            field
        )));
    }
    Ok(())
}

/// E.164-style check: optional leading `+`, 10 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let ok = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !ok {
        return Err(AppError::BadRequest(
            "phone must be a valid phone number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_token(token: &str) -> Result<(), AppError> {
    if token.len() < 16 {
        return Err(AppError::BadRequest(
            "token must be longer than or equal to 16 characters".to_string(),
        ));
    }
    Ok(())
}
