//! Signed bearer token issuance and validation
//!
//! Tokens are HS256-signed JWTs carrying `{sub: email, iat, exp}`. The
//! signing key is built once at service construction and immutable for the
//! process lifetime; without a configured secret a random key is generated,
//! so tokens issued before a restart become unverifiable afterward.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::models::User;

/// Default token lifetime: one hour, in milliseconds
const DEFAULT_EXPIRATION_MS: i64 = 3_600_000;

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens; a random key is generated when absent
    pub secret: Option<String>,
    /// Token lifetime in milliseconds
    pub expiration_ms: i64,
}

impl TokenConfig {
    pub fn new() -> Self {
        Self {
            secret: None,
            expiration_ms: DEFAULT_EXPIRATION_MS,
        }
    }

    /// Load configuration from `JWT_SECRET` and `JWT_EXPIRATION_MS`
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.trim().is_empty());

        let expiration_ms = std::env::var("JWT_EXPIRATION_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRATION_MS);

        Self {
            secret,
            expiration_ms,
        }
    }

    /// Set the signing secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the token lifetime in milliseconds
    pub fn expiration_ms(mut self, ms: i64) -> Self {
        self.expiration_ms = ms;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Token errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token subject does not match the expected identity")]
    SubjectMismatch,

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken | ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidToken
            }
            _ => TokenError::DecodingError(err.to_string()),
        }
    }
}

/// JWT claims structure
///
/// `exp` has one-second granularity per RFC 7519, so the configured
/// millisecond lifetime is truncated to whole seconds on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user's login email)
    pub sub: String,
    /// Unique token id; `iat`/`exp` alone cannot tell two issues within the
    /// same second apart
    pub jti: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Additional claims; never allowed to shadow the reserved names
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Token service for issuing and validating signed bearer tokens
pub struct TokenService {
    expiration_ms: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a new token service
    ///
    /// When no secret is configured a 32-byte random key is generated here,
    /// once, and logged hex-encoded so an operator can recover it.
    pub fn new(config: TokenConfig) -> Self {
        let secret: Vec<u8> = match config.secret {
            Some(secret) if !secret.trim().is_empty() => secret.into_bytes(),
            _ => {
                let mut key = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut key);
                tracing::warn!(
                    "no signing secret configured; generated key (hex): {}",
                    hex::encode(key)
                );
                key.to_vec()
            }
        };

        Self {
            expiration_ms: config.expiration_ms,
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
        }
    }

    /// Configured token lifetime in milliseconds
    pub fn expiration_millis(&self) -> i64 {
        self.expiration_ms
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_with_claims(user, HashMap::new())
    }

    /// Issue a signed token carrying additional claims
    ///
    /// Reserved claims (`sub`, `jti`, `iat`, `exp`) always win over
    /// caller-supplied entries of the same name.
    pub fn issue_with_claims(
        &self,
        user: &User,
        mut extra: HashMap<String, serde_json::Value>,
    ) -> Result<String, TokenError> {
        for reserved in ["sub", "jti", "iat", "exp"] {
            extra.remove(reserved);
        }

        let now = Utc::now();
        let exp = now + Duration::milliseconds(self.expiration_ms);

        let claims = Claims {
            sub: user.email.clone(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            extra,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// Signature verification happens before any claim is trusted. Expiry is
    /// checked with zero leeway: `exp < now` is expired, `exp == now` is not.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validate a token against a specific user
    ///
    /// Fails closed on bad signature, expiry, or a subject that is not the
    /// user's login email.
    pub fn validate(&self, token: &str, user: &User) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;

        if claims.sub != user.email {
            return Err(TokenError::SubjectMismatch);
        }

        Ok(claims)
    }
}
