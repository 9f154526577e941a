//! Business logic behind the HTTP handlers.

mod auth;
mod confirm;
mod database;
mod email;
mod email_confirmation;
mod jwt;
mod password_recovery;
mod two_factor;
mod users;

pub use auth::{AuthService, ClientInfo, SignInOutcome};
pub use confirm::{ConfirmService, CONFIRM_MAX_ATTEMPTS};
pub use database::Database;
pub use email::{EmailProvider, EmailService, MockEmailService, SentEmail};
pub use email_confirmation::EmailConfirmationService;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, TokenPair};
pub use password_recovery::PasswordRecoveryService;
pub use two_factor::TwoFactorService;
pub use users::UsersService;
