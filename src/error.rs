use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    /// SMTP dispatch failed after the compensating delete ran.
    #[error("{0}")]
    MailDispatch(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ErrorResponse {
            status_code: u16,
            message: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NotFound(msg) => {
                tracing::debug!(message = %msg, "Not found");
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::Unauthorized(msg) => {
                tracing::debug!(message = %msg, "Unauthorized");
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::MailDispatch(msg) => {
                tracing::error!(error = %msg, "Mail dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!(
                        "Ошибка при отправке письма. Действие отменено. Ошибка: {}",
                        msg
                    ),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Внутренняя ошибка сервера".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Внутренняя ошибка сервера".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                status_code: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}
