use crate::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub mailer: MailerConfig,
    pub frontend_url: String,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expires_in_minutes: i64,
    pub refresh_token_expires_in_days: i64,
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Deployment contract requires this key; cookies themselves carry
    /// bare JWTs, so it only gates startup.
    pub secret: String,
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub origin: Vec<String>,
    pub methods: Vec<String>,
    pub credentials: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AppConfig {
            host: get_env("HOST", Some("0.0.0.0"), is_prod)?,
            port: parse_env("PORT", Some("5000"), is_prod)?,
            environment,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?,
                min_connections: 1,
            },
            jwt: JwtConfig {
                access_token_secret: get_env("JWT_ACCESS_TOKEN_SECRET", None, is_prod)?,
                refresh_token_secret: get_env("JWT_REFRESH_TOKEN_SECRET", None, is_prod)?,
                access_token_expires_in_minutes: parse_env(
                    "JWT_ACCESS_TOKEN_EXPIRES_IN_MINUTES",
                    Some("15"),
                    is_prod,
                )?,
                refresh_token_expires_in_days: parse_env(
                    "JWT_REFRESH_TOKEN_EXPIRES_IN_DAYS",
                    Some("14"),
                    is_prod,
                )?,
            },
            cookie: CookieConfig {
                secret: get_env("COOKIE_SECRET", None, is_prod)?,
                secure: parse_env("COOKIE_SECURE", Some("true"), is_prod)?,
            },
            mailer: MailerConfig {
                host: get_env("MAILER_HOST", None, is_prod)?,
                port: parse_env("MAILER_PORT", Some("587"), is_prod)?,
                user: get_env("MAILER_USER", None, is_prod)?,
                pass: get_env("MAILER_PASS", None, is_prod)?,
                from: get_env("MAILER_FROM", None, is_prod)?,
            },
            frontend_url: get_env("FRONTEND_URL", Some("http://localhost:3000"), is_prod)?,
            cors: CorsConfig {
                origin: get_env("CORS_ORIGIN", Some("http://localhost:3000"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                methods: get_env("CORS_METHODS", Some("GET,POST,PUT,DELETE,OPTIONS"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                credentials: parse_env("CORS_CREDENTIALS", Some("true"), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.access_token_secret.len() < 32 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "JWT_ACCESS_TOKEN_SECRET must be at least 32 characters"
            )));
        }

        if self.jwt.refresh_token_secret.len() < 32 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "JWT_REFRESH_TOKEN_SECRET must be at least 32 characters"
            )));
        }

        if self.cookie.secret.len() < 32 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "COOKIE_SECRET must be at least 32 characters"
            )));
        }

        if self.jwt.access_token_expires_in_minutes <= 0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "JWT_ACCESS_TOKEN_EXPIRES_IN_MINUTES must be positive"
            )));
        }

        if self.jwt.refresh_token_expires_in_days <= 0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "JWT_REFRESH_TOKEN_EXPIRES_IN_DAYS must be positive"
            )));
        }

        if self.environment == Environment::Prod
            && self.cors.origin.iter().any(|o| o == "*")
        {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Internal(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Internal(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: Option<&str>, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, default, is_prod)?
        .parse()
        .map_err(|e: T::Err| AppError::Internal(anyhow::anyhow!("{}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
