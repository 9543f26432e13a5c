//! Session Models
//!
//! Data structures for the signed session tokens that ride in the auth
//! cookie.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// JWT claims structure for session tokens
///
/// Contains the standard expiry claims plus the identity fields clients
/// render without a round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject, the user id as a string
    pub sub: String,

    /// Username of the authenticated user
    pub username: String,

    /// Issue time, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

impl SessionClaims {
    /// Create new session claims
    pub fn new(
        user_id: Uuid,
        username: &str,
        expires_at: DateTime<Utc>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Caller identity extracted from a validated session token
///
/// Attached to requests by the identity middleware; handlers that need an
/// authenticated user read it from request extensions.
#[derive(Debug, Clone)]
pub struct Identity {
    /// User ID extracted from the token subject
    pub user_id: Uuid,

    /// Username carried in the token
    pub username: String,
}

impl Identity {
    /// Create an identity from session claims
    pub fn from_claims(claims: &SessionClaims) -> Result<Self, uuid::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            username: claims.username.clone(),
        })
    }
}

/// Successful authentication result
///
/// Returned by login and email verification. The token is also set as a
/// cookie at the HTTP layer so browser clients stay logged in.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    /// The authenticated user's public profile
    pub user: User,

    /// Signed session token
    pub token: String,
}
