use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{ApiResponse, ConfirmEmailDto, ConfirmEmailQuery, EmailQuery, ErrorResponse},
    error::AppError,
    AppState,
};

/// Re-send the confirmation link
#[utoipa::path(
    post,
    path = "/api/v1/email-confirmation/resend",
    params(EmailQuery),
    responses(
        (status = 200, description = "Confirmation link mailed", body = ApiResponse),
        (status = 400, description = "Already confirmed or link still valid", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Mail dispatch failed", body = ErrorResponse)
    ),
    tag = "Email confirmation"
)]
pub async fn resend_confirm_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .email_confirmation_service
        .send_confirm_email(&query.email)
        .await
}

/// Re-send the confirmation link, auth-prefixed alias
#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-confirm-email",
    params(EmailQuery),
    responses(
        (status = 200, description = "Confirmation link mailed", body = ApiResponse),
        (status = 400, description = "Already confirmed or link still valid", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Mail dispatch failed", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn resend_confirm_email_auth(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .email_confirmation_service
        .send_confirm_email(&query.email)
        .await
}

/// Confirm an email address from the mailed link
#[utoipa::path(
    get,
    path = "/api/v1/auth/confirm-email",
    params(ConfirmEmailQuery),
    responses(
        (status = 200, description = "Email confirmed", body = ApiResponse),
        (status = 400, description = "Wrong or expired token", body = ErrorResponse),
        (status = 404, description = "No live confirmation", body = ErrorResponse)
    ),
    tag = "Email confirmation"
)]
pub async fn confirm_email_link(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .email_confirmation_service
        .confirm_email(&query.token, &query.email)
        .await
}

/// Confirm an email address with a JSON body
#[utoipa::path(
    post,
    path = "/api/v1/email-confirmation",
    request_body = ConfirmEmailDto,
    responses(
        (status = 200, description = "Email confirmed", body = ApiResponse),
        (status = 400, description = "Wrong or expired token", body = ErrorResponse),
        (status = 404, description = "No live confirmation", body = ErrorResponse)
    ),
    tag = "Email confirmation"
)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(dto): Json<ConfirmEmailDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    state
        .email_confirmation_service
        .confirm_email(&dto.token, &dto.email)
        .await
}
