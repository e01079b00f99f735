//! JWT token validation
//!
//! Tokens are issued by the identity service; this server only verifies
//! them to learn who is acting.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 secret (at least 32 bytes outside development)
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,
}

/// JWT validation service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// The authenticated user behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorUser {
    pub id: i64,
}

impl TryFrom<Claims> for ActorUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken(format!("non-numeric subject: {}", claims.sub)))?;
        Ok(Self { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: SECRET.into(),
            issuer: "wms".into(),
            audience: "wms-clients".into(),
        })
    }

    fn token(sub: &str, exp_offset: i64, iss: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.into(),
            exp: now + exp_offset,
            iat: now,
            iss: iss.into(),
            aud: "wms-clients".into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_token() {
        let claims = service().validate_token(&token("42", 3600, "wms")).unwrap();
        let actor = ActorUser::try_from(claims).unwrap();
        assert_eq!(actor.id, 42);
    }

    #[test]
    fn test_expired_token() {
        let result = service().validate_token(&token("42", -3600, "wms"));
        assert!(matches!(result, Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_wrong_issuer() {
        let result = service().validate_token(&token("42", 3600, "someone-else"));
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = service().validate_token(&token("alice", 3600, "wms")).unwrap();
        assert!(ActorUser::try_from(claims).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
