//! Password Reset Service
//!
//! Hands out the single-use reset tokens carried in emailed links, and
//! validates them when the new password arrives. Token state lives on the
//! account row itself.

use std::sync::Arc;

use crate::models::user::UserRecord;
use crate::service::auth::AuthError;
use crate::store::UserRepository;
use crate::utils::security::{create_expiration, generate_reset_token, is_expired};

/// Reset tokens live for one hour
pub const RESET_TOKEN_TTL_SECONDS: i64 = 3600;

/// Result of asking for a reset token
#[derive(Debug, Clone)]
pub struct IssuedReset {
    /// The live reset token for this account
    pub token: String,

    /// True when a new token was generated by this call. A repeated request
    /// within the validity window reuses the outstanding token.
    pub fresh: bool,
}

/// Reset token issue and redemption logic over the user repository
pub struct ResetTokenStore {
    users: Arc<dyn UserRepository>,
    token_ttl_seconds: i64,
}

impl ResetTokenStore {
    /// Create a reset token store with the standard one hour validity
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            token_ttl_seconds: RESET_TOKEN_TTL_SECONDS,
        }
    }

    /// Create a reset token store with a custom validity window
    pub fn with_ttl(users: Arc<dyn UserRepository>, token_ttl_seconds: i64) -> Self {
        Self {
            users,
            token_ttl_seconds,
        }
    }

    /// Return the live reset token for this account, generating one only if
    /// none is outstanding or the outstanding one has expired
    pub async fn issue_if_absent_or_expired(
        &self,
        user: &UserRecord,
    ) -> Result<IssuedReset, AuthError> {
        if let (Some(token), Some(expires_at)) = (&user.reset_token, user.reset_token_expires_at) {
            if !is_expired(expires_at) {
                return Ok(IssuedReset {
                    token: token.clone(),
                    fresh: false,
                });
            }
        }

        let token = generate_reset_token();
        let mut updated = user.clone();
        updated.reset_token = Some(token.clone());
        updated.reset_token_expires_at = Some(create_expiration(self.token_ttl_seconds));
        self.users.update(&updated).await?;

        Ok(IssuedReset { token, fresh: true })
    }

    /// Look up and validate the account holding `token`
    ///
    /// Unknown and expired tokens fail the same way. The caller finishes the
    /// redemption by clearing the token fields and storing the new password
    /// hash in one update.
    pub async fn consume(&self, token: &str) -> Result<UserRecord, AuthError> {
        let user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        match user.reset_token_expires_at {
            Some(expires_at) if !is_expired(expires_at) => Ok(user),
            _ => Err(AuthError::ResetTokenInvalid),
        }
    }
}
