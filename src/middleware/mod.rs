pub mod auth;

pub use auth::{auth_middleware, AuthenticatedUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
