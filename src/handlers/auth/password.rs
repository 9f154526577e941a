use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    dtos::{ApiResponse, ChangePasswordDto, ErrorResponse},
    error::AppError,
    middleware::AuthenticatedUser,
    AppState,
};

/// Change the password of the authenticated account
#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse),
        (status = 400, description = "Wrong old password or validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Auth",
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
