//! Session Token Service
//!
//! Issues and validates the signed session tokens that authenticate
//! requests. Sessions are stateless: everything the middleware needs rides
//! in the token itself.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::models::session::{Identity, SessionClaims};
use crate::models::user::UserRecord;
use crate::service::auth::AuthError;

/// How long a session lives, matching the cookie's Max-Age
pub const SESSION_TTL_HOURS: i64 = 24;

/// Session token service for issuing and validating tokens
#[derive(Clone)]
pub struct SessionService {
    /// HMAC signing secret
    secret: String,
    /// Session lifetime
    expires_in: Duration,
}

impl SessionService {
    /// Create a session service with the standard 24 hour lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_in: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Create a session service with a custom lifetime
    pub fn with_expiration(secret: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            secret: secret.into(),
            expires_in,
        }
    }

    /// Issue a fresh session token for a user
    pub fn issue(&self, user: &UserRecord) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims::new(user.id, &user.username, now + self.expires_in, now);

        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());

        encode(&header, &claims, &encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Decode and validate a session token
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());

        decode::<SessionClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Validate a session token and extract the caller identity
    pub fn identity(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.decode(token)?;
        Identity::from_claims(&claims)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".into()))
    }
}
