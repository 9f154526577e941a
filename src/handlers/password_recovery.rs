use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    dtos::{
        ApiResponse, ChangePasswordDto, ErrorResponse, RequestPasswordResetDto, ResetPasswordDto,
    },
    error::AppError,
    middleware::AuthenticatedUser,
    AppState,
};

/// Request a password-reset link
#[utoipa::path(
    post,
    path = "/api/v1/password-recovery/request",
    request_body = RequestPasswordResetDto,
    responses(
        (status = 200, description = "Reset link mailed", body = ApiResponse),
        (status = 400, description = "Validation error or link still valid", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Mail dispatch failed", body = ErrorResponse)
    ),
    tag = "Password recovery"
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(dto): Json<RequestPasswordResetDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    state
        .password_recovery_service
        .request_reset(&dto.email)
        .await
}

/// Reset a forgotten password with the mailed token
#[utoipa::path(
    post,
    path = "/api/v1/password-recovery/reset",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse),
        (status = 400, description = "Wrong or expired token", body = ErrorResponse),
        (status = 404, description = "No live reset token", body = ErrorResponse)
    ),
    tag = "Password recovery"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(dto): Json<ResetPasswordDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    state.password_recovery_service.reset_password(&dto).await
}

/// Change the password of the authenticated account
#[utoipa::path(
    put,
    path = "/api/v1/password-recovery",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse),
        (status = 400, description = "Wrong old password or validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Password recovery",
    security(("cookie_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<ChangePasswordDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    state
        .password_recovery_service
        .change_password(user.id, &dto)
        .await
}
