use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{self, SecurityConfig};

pub mod password;

/// Which half of a token pair a JWT represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub kind: TokenKind,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i32, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            kind,
            jti: Uuid::new_v4(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Access and refresh tokens issued together at sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("expected {expected:?} token, got {actual:?}")]
    WrongKind { expected: TokenKind, actual: TokenKind },

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),
}

/// Signs and verifies the service's JWTs
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            security.jwt_secret.clone(),
            Duration::minutes(security.access_token_ttl_minutes as i64),
            Duration::hours(security.refresh_token_ttl_hours as i64),
        )
    }

    pub fn issue_pair(&self, user_id: i32) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(&Claims::new(user_id, TokenKind::Access, self.access_ttl))?,
            refresh_token: self.sign(&Claims::new(user_id, TokenKind::Refresh, self.refresh_ttl))?,
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, and that the token is of the expected kind
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }
}

/// Issuer built from the global configuration
pub fn issuer() -> TokenIssuer {
    TokenIssuer::from_config(&config::config().security)
}
