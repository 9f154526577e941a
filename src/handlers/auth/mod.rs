pub mod password;
pub mod registration;
pub mod session;

pub use password::change_password;
pub use registration::sign_up;
pub use session::{me, refresh_tokens, sign_in_with_email, sign_in_with_phone, sign_out};
