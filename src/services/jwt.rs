use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT service for token generation and validation.
///
/// Access and refresh tokens are signed with separate HS256 secrets, so a
/// leaked access token can never pass refresh verification.
#[derive(Clone)]
pub struct JwtService {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    access_token_expires_in_minutes: i64,
    refresh_token_expires_in_days: i64,
}

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Role set at issue time
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims for refresh tokens (long-lived)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Signed pair handed to the cookie layer.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl JwtService {
    /// Create a new JWT service from the configured secrets.
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(
                config.refresh_token_secret.as_bytes(),
            ),
            refresh_decoding_key: DecodingKey::from_secret(
                config.refresh_token_secret.as_bytes(),
            ),
            access_token_expires_in_minutes: config.access_token_expires_in_minutes,
            refresh_token_expires_in_days: config.refresh_token_expires_in_days,
        }
    }

    /// Generate an access token carrying the user's current roles.
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        roles: &[String],
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expires_in_minutes);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.access_encoding_key,
        )
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_token_expires_in_days);

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.refresh_encoding_key,
        )
        .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))?;

        Ok(token)
    }

    /// Generate both access and refresh tokens.
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        roles: &[String],
    ) -> Result<TokenPair, anyhow::Error> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id, roles)?,
            refresh_token: self.generate_refresh_token(user_id)?,
        })
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data =
            decode::<AccessTokenClaims>(token, &self.access_decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(
        &self,
        token: &str,
    ) -> Result<RefreshTokenClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data =
            decode::<RefreshTokenClaims>(token, &self.refresh_decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Cookie max-age for the access token.
    pub fn access_token_max_age(&self) -> time::Duration {
        time::Duration::minutes(self.access_token_expires_in_minutes)
    }

    /// Cookie max-age for the refresh token.
    pub fn refresh_token_max_age(&self) -> time::Duration {
        time::Duration::days(self.refresh_token_expires_in_days)
    }

    /// Refresh session lifetime for persisted rows.
    pub fn refresh_token_expires_in_days(&self) -> i64 {
        self.refresh_token_expires_in_days
    }
}
