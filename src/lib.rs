pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::config::{AppConfig, Environment};
use crate::dtos::ErrorResponse;
use crate::error::AppError;
use crate::middleware::ACCESS_TOKEN_COOKIE;
use crate::services::{
    AuthService, Database, EmailConfirmationService, JwtService, PasswordRecoveryService,
    UsersService,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SkillBridge API",
        description = "SkillBridge API documentation",
        version = "1.0"
    ),
    paths(
        health_check,
        handlers::auth::registration::sign_up,
        handlers::auth::session::sign_in_with_email,
        handlers::auth::session::sign_in_with_phone,
        handlers::auth::session::refresh_tokens,
        handlers::auth::session::sign_out,
        handlers::auth::session::me,
        handlers::auth::password::change_password,
        handlers::email_confirmation::resend_confirm_email,
        handlers::email_confirmation::resend_confirm_email_auth,
        handlers::email_confirmation::confirm_email_link,
        handlers::email_confirmation::confirm_email,
        handlers::password_recovery::request_password_reset,
        handlers::password_recovery::reset_password,
        handlers::password_recovery::change_password,
        handlers::users::create_user,
        handlers::users::list_users,
    ),
    components(
        schemas(
            dtos::ApiResponse,
            dtos::ErrorResponse,
            dtos::auth::SignInWithEmailDto,
            dtos::auth::SignInWithPhoneDto,
            dtos::auth::ConfirmEmailDto,
            dtos::password::RequestPasswordResetDto,
            dtos::password::ResetPasswordDto,
            dtos::password::ChangePasswordDto,
            dtos::users::CreateUserDto,
            dtos::users::UsersPage,
            models::SanitizedUser,
            models::Role,
            models::Gender,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, sign-in and session management"),
        (name = "Email confirmation", description = "Email confirmation links"),
        (name = "Password recovery", description = "Password reset and change"),
        (name = "Users", description = "User directory"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub jwt: JwtService,
    pub auth_service: AuthService,
    pub users_service: UsersService,
    pub email_confirmation_service: EmailConfirmationService,
    pub password_recovery_service: PasswordRecoveryService,
}

/// Install the global tracing subscriber: JSON lines in prod, pretty in dev.
/// The filter comes from RUST_LOG, defaulting to `info`.
pub fn init_tracing(environment: &Environment) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match environment {
        Environment::Prod => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        Environment::Dev => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init(),
    }
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let public_routes = Router::new()
        .route("/auth/sign-up", post(handlers::auth::sign_up))
        .route(
            "/auth/sign-in-with-email",
            post(handlers::auth::sign_in_with_email),
        )
        .route(
            "/auth/sign-in-with-phone",
            post(handlers::auth::sign_in_with_phone),
        )
        .route("/auth/refresh-tokens", post(handlers::auth::refresh_tokens))
        .route(
            "/auth/resend-confirm-email",
            post(handlers::email_confirmation::resend_confirm_email_auth),
        )
        .route(
            "/auth/confirm-email",
            get(handlers::email_confirmation::confirm_email_link),
        )
        .route(
            "/email-confirmation",
            post(handlers::email_confirmation::confirm_email),
        )
        .route(
            "/email-confirmation/resend",
            post(handlers::email_confirmation::resend_confirm_email),
        )
        .route(
            "/password-recovery/request",
            post(handlers::password_recovery::request_password_reset),
        )
        .route(
            "/password-recovery/reset",
            post(handlers::password_recovery::reset_password),
        );

    let protected_routes = Router::new()
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route(
            "/password-recovery",
            put(handlers::password_recovery::change_password),
        )
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut origins = Vec::with_capacity(state.config.cors.origin.len());
    for origin in &state.config.cors.origin {
        origins.push(origin.parse::<HeaderValue>().map_err(|e| {
            AppError::Internal(anyhow::anyhow!("invalid CORS origin '{}': {}", origin, e))
        })?);
    }

    let mut methods = Vec::with_capacity(state.config.cors.methods.len());
    for method in &state.config.cors.methods {
        methods.push(method.parse::<Method>().map_err(|e| {
            AppError::Internal(anyhow::anyhow!("invalid CORS method '{}': {}", method, e))
        })?);
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(state.config.cors.credentials);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(cors);

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Service is unhealthy", body = ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": format!("{:?}", state.config.environment),
    })))
}
