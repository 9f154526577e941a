use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{ApiResponse, CreateUserDto, ErrorResponse, ListUsersQuery, UsersPage},
    error::AppError,
    AppState,
};

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse),
        (status = 400, description = "Validation error or duplicate user", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;
    let user = state.users_service.create(&dto).await?;
    ApiResponse::with_data(
        StatusCode::CREATED,
        "Пользователь успешно создан",
        &user.sanitized(),
    )
}

/// List users with pagination
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UsersPage),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .users_service
        .find_all_paginated(query.page.unwrap_or(1), query.per_page.unwrap_or(10))
        .await
}
