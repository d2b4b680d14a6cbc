use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Payload of an access token: the username it asserts and the expiration
/// instant as a unix timestamp. `sub` is optional on the wire so a decoded
/// payload that lacks it can be rejected explicitly rather than failing
/// deserialization.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

/// Issues and verifies HS256-signed bearer tokens. Stateless: every call is
/// a pure function of the configured secret and the wall clock.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_with_ttl(username, self.ttl)
    }

    pub fn issue_with_ttl(&self, username: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims {
            sub: Some(username.to_string()),
            exp: (Utc::now() + ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Checks signature and expiration, then requires the username claim.
    /// Malformed, tampered, expired, and subject-less tokens all surface as
    /// `AppError::Authentication` (401).
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        data.claims.sub.ok_or_else(|| {
            AppError::Authentication("Token payload has no subject claim".to_string())
        })
    }

    #[cfg(test)]
    pub fn encode_raw_claims(&self, claims: &Claims) -> Result<String, AppError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }
}
