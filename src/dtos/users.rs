use crate::error::AppError;
use crate::models::{Gender, SanitizedUser};
use crate::utils::validation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Registration payload, shared by POST /auth/sign-up and POST /users.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    #[schema(example = "user@example.com")]
    pub email: String,

    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    #[schema(example = "Иван")]
    pub first_name: String,

    #[schema(example = "Иванов")]
    pub last_name: String,

    #[schema(example = "Иванович")]
    pub surname: Option<String>,

    #[schema(example = "+79991234567")]
    pub phone: Option<String>,

    #[schema(example = "2000-01-15")]
    pub date_of_birth: Option<NaiveDate>,

    pub gender: Option<Gender>,
}

impl CreateUserDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_email(&self.email)?;
        validation::validate_password("password", &self.password)?;
        validation::validate_required("firstName", &self.first_name)?;
        validation::validate_required("lastName", &self.last_name)?;
        if let Some(phone) = &self.phone {
            validation::validate_phone(phone)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// 1-based page number, defaults to 1.
    pub page: Option<i64>,
    /// Page size, defaults to 10.
    pub per_page: Option<i64>,
}

/// Paginated user listing. Same envelope keys as `ApiResponse` plus the
/// pagination counters at the top level.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    #[schema(example = 200)]
    pub status_code: u16,
    #[schema(example = "Пользователи успешно получены")]
    pub message: String,
    pub data: Vec<SanitizedUser>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl IntoResponse for UsersPage {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
