pub mod auth;
pub mod password;
pub mod users;

pub use auth::{ConfirmEmailDto, ConfirmEmailQuery, EmailQuery, SignInWithEmailDto, SignInWithPhoneDto};
pub use password::{ChangePasswordDto, RequestPasswordResetDto, ResetPasswordDto};
pub use users::{CreateUserDto, ListUsersQuery, UsersPage};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Uniform success envelope. Every 2xx body carries the HTTP status code,
/// a human-readable message and a payload (JSON null when there is none).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[schema(example = 200)]
    pub status_code: u16,
    #[schema(example = "Авторизация успешна")]
    pub message: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl ApiResponse {
    pub fn new(
        status_code: StatusCode,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            status_code: status_code.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// Envelope with a null payload.
    pub fn message(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status_code, message, serde_json::Value::Null)
    }

    /// Envelope with a serialized payload.
    pub fn with_data<T: Serialize>(
        status_code: StatusCode,
        message: impl Into<String>,
        data: &T,
    ) -> Result<Self, crate::error::AppError> {
        let data = serde_json::to_value(data).map_err(anyhow::Error::from)?;
        Ok(Self::new(status_code, message, data))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Error body shape produced by `error::AppError`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = 400)]
    pub status_code: u16,
    #[schema(example = "Неверные данные для входа")]
    pub message: String,
}
