//! Sign-up, sign-in and refresh-session management.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;
use uuid::Uuid;

use crate::dtos::{ApiResponse, CreateUserDto, SignInWithEmailDto, SignInWithPhoneDto};
use crate::error::AppError;
use crate::models::{ConfirmKind, RefreshToken, User};
use crate::services::{
    ConfirmService, Database, EmailConfirmationService, JwtService, TokenPair, TwoFactorService,
    UsersService,
};
use crate::utils::Password;

/// Caller network identity. Handlers fill this in from the socket address
/// and the User-Agent header; both are required before a session is issued.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn require(&self) -> Result<(&str, &str), AppError> {
        match (self.ip.as_deref(), self.user_agent.as_deref()) {
            (Some(ip), Some(ua)) if !ip.is_empty() && !ua.is_empty() => Ok((ip, ua)),
            _ => Err(AppError::BadRequest(
                "Ip (и) или userAgent не указан(ы)".to_string(),
            )),
        }
    }
}

/// Outcome of a sign-in attempt.
pub enum SignInOutcome {
    /// Credentials accepted: cookies are set and the sanitized user returned.
    Authorized { user: Box<User>, tokens: TokenPair },
    /// A confirmation step intercepted the flow (unconfirmed email, or a
    /// freshly mailed 2FA code): its envelope is returned without cookies.
    Pending(ApiResponse),
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    users: UsersService,
    jwt: JwtService,
    confirm: ConfirmService,
    email_confirmation: EmailConfirmationService,
    two_factor: TwoFactorService,
}

impl AuthService {
    pub fn new(
        db: Database,
        users: UsersService,
        jwt: JwtService,
        confirm: ConfirmService,
        email_confirmation: EmailConfirmationService,
        two_factor: TwoFactorService,
    ) -> Self {
        Self {
            db,
            users,
            jwt,
            confirm,
            email_confirmation,
            two_factor,
        }
    }

    /// Register an account and mail the confirmation link (valid 5 minutes).
    #[tracing::instrument(skip_all, fields(email = %dto.email))]
    pub async fn sign_up(&self, dto: &CreateUserDto) -> Result<ApiResponse, AppError> {
        let user = self.users.create(dto).await?;
        let artifact = self
            .confirm
            .issue(&user, ConfirmKind::Mail, Duration::minutes(5))
            .await?;

        Ok(ApiResponse::new(
            StatusCode::CREATED,
            "Вы успешно зарегистрировались. Подтвердите электронную почту. Ссылка для подтверждения отправлена на вашу почту. Ссылка действительна 5 минут",
            json!({
                "id": user.id,
                "email": user.email,
                "mailConfirmCodeExpiresAt": artifact.expires_at,
            }),
        ))
    }

    #[tracing::instrument(skip_all, fields(email = %dto.email))]
    pub async fn sign_in_with_email(
        &self,
        dto: &SignInWithEmailDto,
        client: &ClientInfo,
    ) -> Result<SignInOutcome, AppError> {
        let user = self
            .users
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(|| AppError::BadRequest("Неверные данные для входа".to_string()))?;

        self.sign_in(
            user,
            &dto.password,
            dto.two_factor_mail_auth_code.as_deref(),
            client,
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(phone = %dto.phone))]
    pub async fn sign_in_with_phone(
        &self,
        dto: &SignInWithPhoneDto,
        client: &ClientInfo,
    ) -> Result<SignInOutcome, AppError> {
        let user = self
            .users
            .find_by_phone(&dto.phone)
            .await?
            .ok_or_else(|| AppError::BadRequest("Неверные данные для входа".to_string()))?;

        self.sign_in(
            user,
            &dto.password,
            dto.two_factor_mail_auth_code.as_deref(),
            client,
        )
        .await
    }

    async fn sign_in(
        &self,
        user: User,
        password: &str,
        two_factor_code: Option<&str>,
        client: &ClientInfo,
    ) -> Result<SignInOutcome, AppError> {
        if !Password::new(password).matches(&user.password_hash)? {
            return Err(AppError::BadRequest("Неверные данные для входа".to_string()));
        }

        let (ip, user_agent) = client.require()?;

        if !user.email_confirmed {
            let envelope = self.email_confirmation.send_confirm_email(&user.email).await?;
            return Ok(SignInOutcome::Pending(envelope));
        }

        if user.two_factor_mail_enabled {
            // An empty string from the client counts as no code
            match two_factor_code.filter(|c| !c.is_empty()) {
                None => {
                    let envelope = self.two_factor.send_code(&user).await?;
                    return Ok(SignInOutcome::Pending(envelope));
                }
                Some(code) => self.two_factor.validate_code(&user, code).await?,
            }
        }

        let tokens = self.issue_session(&user, ip, user_agent).await?;
        Ok(SignInOutcome::Authorized {
            user: Box::new(user),
            tokens,
        })
    }

    /// Mint a token pair and persist the refresh session, evicting earlier
    /// sessions from the same client and any already-expired ones first.
    async fn issue_session(
        &self,
        user: &User,
        ip: &str,
        user_agent: &str,
    ) -> Result<TokenPair, AppError> {
        let tokens = self.jwt.generate_token_pair(user.id, &user.roles)?;

        self.db
            .delete_refresh_tokens_by_client(user.id, ip, user_agent)
            .await?;
        self.db.delete_expired_refresh_tokens(user.id).await?;

        let session = RefreshToken::new(
            user.id,
            tokens.refresh_token.clone(),
            ip.to_string(),
            user_agent.to_string(),
            self.jwt.refresh_token_expires_in_days(),
        );
        self.db.insert_refresh_token(&session).await?;

        Ok(tokens)
    }

    /// Rotate the refresh session carried by the cookie.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(
        &self,
        refresh_token: Option<&str>,
        client: &ClientInfo,
    ) -> Result<TokenPair, AppError> {
        let token = refresh_token
            .ok_or_else(|| AppError::NotFound("Не найден refresh token".to_string()))?;
        let (ip, user_agent) = client.require()?;

        let claims = match self.jwt.validate_refresh_token(token) {
            Ok(claims) => claims,
            Err(_) => {
                self.db.delete_refresh_tokens_by_token(token).await?;
                return Err(AppError::BadRequest("Неверный refresh token".to_string()));
            }
        };

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::BadRequest("Неверный refresh token".to_string()))?;
        let user = self
            .db
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Пользователь не найден".to_string()))?;

        let session = self
            .db
            .find_refresh_token(user.id, token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Неверный refresh token".to_string()))?;

        if session.is_expired() {
            self.db.delete_refresh_token_by_id(session.id).await?;
            return Err(AppError::BadRequest("Токен отозван".to_string()));
        }

        self.issue_session(&user, ip, user_agent).await
    }

    /// Drop the refresh session carried by the cookie.
    #[tracing::instrument(skip_all)]
    pub async fn sign_out(&self, refresh_token: Option<&str>) -> Result<ApiResponse, AppError> {
        let token = refresh_token
            .ok_or_else(|| AppError::NotFound("Не найден refresh token".to_string()))?;

        let deleted = self.db.delete_refresh_tokens_by_token(token).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Не найден refresh token".to_string()));
        }

        Ok(ApiResponse::message(StatusCode::OK, "Вы вышли из системы"))
    }

    /// Profile of the authenticated account.
    pub async fn me(&self, user_id: Uuid) -> Result<ApiResponse, AppError> {
        let user = self
            .db
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Пользователь не найден".to_string()))?;

        ApiResponse::with_data(
            StatusCode::OK,
            "Получена информация о пользователе",
            &user.sanitized(),
        )
    }
}
