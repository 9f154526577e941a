use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::net::SocketAddr;

use crate::{
    dtos::{ApiResponse, ErrorResponse, SignInWithEmailDto, SignInWithPhoneDto},
    error::AppError,
    middleware::{AuthenticatedUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
    services::{ClientInfo, SignInOutcome, TokenPair},
    AppState,
};

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in-with-email",
    request_body = SignInWithEmailDto,
    responses(
        (status = 200, description = "Authorized, cookies set", body = ApiResponse),
        (status = 201, description = "Two-factor code mailed", body = ApiResponse),
        (status = 400, description = "Invalid credentials or missing client info", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_in_with_email(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(dto): Json<SignInWithEmailDto>,
) -> Result<Response, AppError> {
    dto.validate()?;
    let client = client_info(connect_info, &headers);
    let outcome = state.auth_service.sign_in_with_email(&dto, &client).await?;
    respond_to_sign_in(outcome, jar, &state)
}

/// Sign in with phone and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in-with-phone",
    request_body = SignInWithPhoneDto,
    responses(
        (status = 200, description = "Authorized, cookies set", body = ApiResponse),
        (status = 201, description = "Two-factor code mailed", body = ApiResponse),
        (status = 400, description = "Invalid credentials or missing client info", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_in_with_phone(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(dto): Json<SignInWithPhoneDto>,
) -> Result<Response, AppError> {
    dto.validate()?;
    let client = client_info(connect_info, &headers);
    let outcome = state.auth_service.sign_in_with_phone(&dto, &client).await?;
    respond_to_sign_in(outcome, jar, &state)
}

/// Rotate the refresh session carried by the cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-tokens",
    responses(
        (status = 200, description = "Tokens rotated, cookies set", body = ApiResponse),
        (status = 400, description = "Invalid or revoked refresh token", body = ErrorResponse),
        (status = 404, description = "Refresh cookie or user missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn refresh_tokens(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let client = client_info(connect_info, &headers);
    let refresh = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let tokens = state.auth_service.refresh(refresh.as_deref(), &client).await?;

    let jar = set_auth_cookies(jar, &tokens, &state);
    let res = ApiResponse::message(StatusCode::OK, "Обновление токенов успешно");
    Ok((jar, res).into_response())
}

/// Sign out and drop the refresh session
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses(
        (status = 200, description = "Signed out, cookies cleared", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Refresh cookie or session missing", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("cookie_auth" = []))
)]
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let refresh = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let res = state.auth_service.sign_out(refresh.as_deref()).await?;

    let jar = clear_auth_cookies(jar);
    Ok((jar, res).into_response())
}

/// Profile of the authenticated account
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Sanitized user returned", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("cookie_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.me(user.id).await
}

fn client_info(connect_info: Option<ConnectInfo<SocketAddr>>, headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip: connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

fn respond_to_sign_in(
    outcome: SignInOutcome,
    jar: CookieJar,
    state: &AppState,
) -> Result<Response, AppError> {
    match outcome {
        SignInOutcome::Authorized { user, tokens } => {
            let jar = set_auth_cookies(jar, &tokens, state);
            let res = ApiResponse::with_data(
                StatusCode::OK,
                "Авторизация успешна",
                &user.sanitized(),
            )?;
            Ok((jar, res).into_response())
        }
        SignInOutcome::Pending(envelope) => Ok(envelope.into_response()),
    }
}

pub(crate) fn set_auth_cookies(jar: CookieJar, tokens: &TokenPair, state: &AppState) -> CookieJar {
    let access = Cookie::build((ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie.secure)
        .same_site(SameSite::None)
        .max_age(state.jwt.access_token_max_age())
        .build();

    let refresh = Cookie::build((REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie.secure)
        .same_site(SameSite::None)
        .max_age(state.jwt.refresh_token_max_age())
        .build();

    jar.add(access).add(refresh)
}

fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    let access = Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build();
    let refresh = Cookie::build((REFRESH_TOKEN_COOKIE, "")).path("/").build();
    jar.remove(access).remove(refresh)
}
