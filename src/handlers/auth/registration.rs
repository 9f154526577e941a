use axum::{extract::State, response::IntoResponse};
use axum::Json;

use crate::{
    dtos::{ApiResponse, CreateUserDto, ErrorResponse},
    error::AppError,
    AppState,
};

/// Register a new account and mail the confirmation link
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "Registered, confirmation link mailed", body = ApiResponse),
        (status = 400, description = "Validation error or duplicate user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    state.auth_service.sign_up(&dto).await
}
