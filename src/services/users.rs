//! Account creation and the paginated user directory.

use axum::http::StatusCode;

use crate::dtos::{CreateUserDto, UsersPage};
use crate::error::AppError;
use crate::models::{SanitizedUser, User};
use crate::services::Database;
use crate::utils::Password;

#[derive(Clone)]
pub struct UsersService {
    db: Database,
}

impl UsersService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create an account. Duplicates are rejected by email, by the
    /// (first name, last name, surname) triple and by phone, in that order.
    #[tracing::instrument(skip_all, fields(email = %dto.email))]
    pub async fn create(&self, dto: &CreateUserDto) -> Result<User, AppError> {
        if self.db.find_user_by_email(&dto.email).await?.is_some() {
            return Err(AppError::BadRequest(
                "Такой пользователь уже существует".to_string(),
            ));
        }
        if self
            .find_by_full_name(&dto.first_name, &dto.last_name, dto.surname.as_deref())
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "Такой пользователь уже существует".to_string(),
            ));
        }
        if let Some(phone) = &dto.phone {
            if self.db.find_user_by_phone(phone).await?.is_some() {
                return Err(AppError::BadRequest(
                    "Такой пользователь уже существует".to_string(),
                ));
            }
        }

        let hash = Password::new(dto.password.as_str()).hash()?;

        let mut user = User::new(
            dto.email.clone(),
            hash,
            dto.first_name.clone(),
            dto.last_name.clone(),
        );
        user.phone = dto.phone.clone();
        user.surname = dto.surname.clone();
        user.date_of_birth = dto.date_of_birth;
        user.gender = dto.gender.map(|g| g.as_str().to_string());

        self.db.insert_user(&user).await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<User>, AppError> {
        self.db.find_user_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.db.find_user_by_email(email).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        self.db.find_user_by_phone(phone).await
    }

    /// Exact match on the full-name triple. A missing surname only matches
    /// accounts without one.
    pub async fn find_by_full_name(
        &self,
        first_name: &str,
        last_name: &str,
        surname: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        self.db
            .find_user_by_full_name(first_name, last_name, surname)
            .await
    }

    /// One page of the user directory, passwords stripped.
    pub async fn find_all_paginated(&self, page: i64, per_page: i64) -> Result<UsersPage, AppError> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let users = self.db.list_users(per_page, (page - 1) * per_page).await?;
        let total = self.db.count_users().await?;

        Ok(UsersPage {
            status_code: StatusCode::OK.as_u16(),
            message: "Пользователи успешно получены".to_string(),
            data: users.into_iter().map(SanitizedUser::from).collect(),
            total,
            page,
            per_page,
        })
    }
}
