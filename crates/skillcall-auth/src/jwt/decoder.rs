//! Access-token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use skillcall_core::config::auth::AuthConfig;
use skillcall_core::error::AppError;

use super::claims::Claims;

/// Validates bearer tokens and yields the caller's claims.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::unauthorized("Token issued by an unknown party")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use skillcall_core::error::ErrorKind;
    use skillcall_core::types::id::UserId;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_round_trip_identity() {
        let cfg = config("test-secret");
        let (token, _) = JwtEncoder::new(&cfg)
            .issue_access_token(&UserId::from("u1"), "Ada", "user")
            .expect("encode");
        let claims = JwtDecoder::new(&cfg).decode_access_token(&token).expect("decode");
        assert_eq!(claims.user_id().as_str(), "u1");
        assert_eq!(claims.name, "Ada");
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let (token, _) = JwtEncoder::new(&config("one"))
            .issue_access_token(&UserId::from("u1"), "Ada", "user")
            .expect("encode");
        let err = JwtDecoder::new(&config("two"))
            .decode_access_token(&token)
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        let err = JwtDecoder::new(&config("one"))
            .decode_access_token("not-a-token")
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
