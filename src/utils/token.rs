use rand::{Rng, RngCore};

/// Generate a 64-character hex token from 32 random bytes.
///
/// Used for email-confirmation and password-reset links.
pub fn generate_confirm_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a 6-digit two-factor code.
pub fn generate_two_factor_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_token_shape() {
        let token = generate_confirm_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_confirm_tokens_are_unique() {
        assert_ne!(generate_confirm_token(), generate_confirm_token());
    }

    #[test]
    fn test_two_factor_code_shape() {
        for _ in 0..100 {
            let code = generate_two_factor_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().expect("code must be numeric");
            assert!((100_000..=999_999).contains(&value));
        }
    }
}
