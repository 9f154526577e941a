pub mod confirm_token;
pub mod refresh_token;
pub mod user;

pub use confirm_token::{ConfirmKind, ConfirmToken};
pub use refresh_token::RefreshToken;
pub use user::{Gender, Role, SanitizedUser, User};
