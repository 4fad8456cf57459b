//! JWT token service.
//!
//! Tokens carry only the user id; the extractor resolves the id against
//! the user store on every request, so role changes and deactivation take
//! effect immediately.

use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing key (should be at least 32 bytes).
    pub secret: String,
    /// Token lifetime in hours.
    pub expiry_hours: i64,
}

/// Claims stored in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issued-at timestamp.
    pub iat: i64,
}

/// JWT errors.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    /// Creates a new JWT service from the given config.
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            expiry: Duration::hours(config.expiry_hours),
        }
    }

    /// Issues a token for a user.
    pub fn issue(&self, user_id: UserId) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Generation(e.to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }

    /// Extracts the raw token from an `Authorization: Bearer <token>`
    /// header value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(expiry_hours: i64) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-at-least-32-characters-long".to_string(),
            expiry_hours,
        })
    }

    #[test]
    fn issue_and_validate_roundtrip() {
        let service = service(1);
        let user_id = UserId::new();

        let token = service.issue(user_id).unwrap();
        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let service = service(1);
        let token = service.issue(UserId::new()).unwrap();

        let other = JwtService::new(&JwtConfig {
            secret: "a-completely-different-32-char-secret!!".to_string(),
            expiry_hours: 1,
        });
        assert!(matches!(other.validate(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service(-1);
        let token = service.issue(UserId::new()).unwrap();
        assert!(matches!(service.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn extract_from_header_handles_malformed_values() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
