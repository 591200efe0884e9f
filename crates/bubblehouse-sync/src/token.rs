//! Self-issued HS256 bearer tokens for the Bubblehouse API.
//!
//! A token is `base64url(header).base64url(claims).base64url(signature)`
//! where the signature is HMAC-SHA256 over the first two segments joined by
//! `.`, keyed with the base64-decoded shared secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::base64url;

type HmacSha256 = Hmac<Sha256>;

/// Audience claim expected by the Bubblehouse API.
pub const TOKEN_AUDIENCE: &str = "BH";

/// Validity used for sync deliveries and embed URLs.
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("shared secret is not valid base64: {0}")]
    InvalidSecret(#[source] base64::DecodeError),

    #[error("token validity must be positive, got {0}s")]
    NonPositiveValidity(i64),

    #[error("failed to serialize token segment: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("shared secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// A signed bearer token. `Debug` does not print the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([redacted])")
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Field order is the serialized order.
#[derive(Serialize)]
struct Header<'a> {
    typ: &'static str,
    alg: &'static str,
    kid: &'a str,
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues a token for `subject`, valid from now for `validity_secs`.
///
/// # Errors
///
/// See [`issue_token_at`].
pub fn issue_token(
    subject: &str,
    key_id: &str,
    secret_base64: &str,
    validity_secs: i64,
) -> Result<AuthToken, TokenError> {
    issue_token_at(subject, key_id, secret_base64, validity_secs, Utc::now())
}

/// Issues a token with `iat` taken from `now`.
///
/// # Errors
///
/// Returns [`TokenError::NonPositiveValidity`] when `validity_secs <= 0` and
/// [`TokenError::InvalidSecret`] when the secret is not base64.
pub fn issue_token_at(
    subject: &str,
    key_id: &str,
    secret_base64: &str,
    validity_secs: i64,
    now: DateTime<Utc>,
) -> Result<AuthToken, TokenError> {
    if validity_secs <= 0 {
        return Err(TokenError::NonPositiveValidity(validity_secs));
    }
    let key = base64url::decode_secret(secret_base64).map_err(TokenError::InvalidSecret)?;

    let iat = now.timestamp();
    let header = Header {
        typ: "JWT",
        alg: "HS256",
        kid: key_id,
    };
    let claims = Claims {
        aud: TOKEN_AUDIENCE.to_string(),
        sub: subject.to_string(),
        iat,
        exp: iat.saturating_add(validity_secs),
    };

    let signing_input = format!(
        "{}.{}",
        base64url::encode(serde_json::to_vec(&header)?),
        base64url::encode(serde_json::to_vec(&claims)?)
    );

    let mut mac = HmacSha256::new_from_slice(&key).map_err(|_| TokenError::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(AuthToken(format!(
        "{signing_input}.{}",
        base64url::encode(signature)
    )))
}
