pub mod auth;
pub mod email_confirmation;
pub mod password_recovery;
pub mod users;
