pub mod password;
pub mod token;
pub mod validation;

pub use password::Password;
pub use token::{generate_confirm_token, generate_two_factor_code};
