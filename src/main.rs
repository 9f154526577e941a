use skillbridge_auth::{
    build_router,
    config::AppConfig,
    init_tracing,
    services::{
        AuthService, ConfirmService, Database, EmailConfirmationService, EmailProvider,
        EmailService, JwtService, PasswordRecoveryService, TwoFactorService, UsersService,
    },
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = AppConfig::from_env()?;

    init_tracing(&config.environment);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting SkillBridge auth service"
    );

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    let email: Arc<dyn EmailProvider> = Arc::new(EmailService::new(&config.mailer)?);
    let jwt = JwtService::new(&config.jwt);

    let users_service = UsersService::new(db.clone());
    let confirm_service =
        ConfirmService::new(db.clone(), email, config.frontend_url.clone());
    let email_confirmation_service = EmailConfirmationService::new(
        db.clone(),
        users_service.clone(),
        confirm_service.clone(),
    );
    let two_factor_service = TwoFactorService::new(confirm_service.clone());
    let password_recovery_service = PasswordRecoveryService::new(
        db.clone(),
        users_service.clone(),
        confirm_service.clone(),
    );
    let auth_service = AuthService::new(
        db.clone(),
        users_service.clone(),
        jwt.clone(),
        confirm_service,
        email_confirmation_service.clone(),
        two_factor_service,
    );

    let state = AppState {
        config: config.clone(),
        db,
        jwt,
        auth_service,
        users_service,
        email_confirmation_service,
        password_recovery_service,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
