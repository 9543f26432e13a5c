//! Verification Code Service
//!
//! Issues the six digit codes that prove ownership of an email address
//! during signup, and checks them when the account is created.

use std::sync::Arc;
use std::time::Duration;

use crate::service::auth::AuthError;
use crate::store::ExpiringStore;
use crate::utils::security::generate_verification_code;

/// Verification codes live for one hour
pub const CODE_TTL: Duration = Duration::from_secs(3600);

/// Key prefix for code entries in the shared expiring store
const CODE_KEY_PREFIX: &str = "verify:";

/// Result of asking for a verification code
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// The live code for this email
    pub code: String,

    /// True when a new code was generated by this call. A repeated signup
    /// reuses the outstanding code and stays quiet.
    pub fresh: bool,
}

/// Verification code issue and check logic over an expiring store
pub struct VerificationCodeStore {
    store: Arc<dyn ExpiringStore>,
    code_ttl: Duration,
}

impl VerificationCodeStore {
    /// Create a code store with the standard one hour validity
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self {
            store,
            code_ttl: CODE_TTL,
        }
    }

    /// Create a code store with a custom validity window
    pub fn with_ttl(store: Arc<dyn ExpiringStore>, code_ttl: Duration) -> Self {
        Self { store, code_ttl }
    }

    /// How long issued codes stay valid
    pub fn validity(&self) -> Duration {
        self.code_ttl
    }

    fn key(email: &str) -> String {
        format!("{}{}", CODE_KEY_PREFIX, email)
    }

    /// Return the live code for this email, generating one only if none
    /// is outstanding
    ///
    /// Reuse leaves the original TTL untouched, so hammering signup cannot
    /// keep a code alive forever.
    pub async fn issue_if_absent(&self, email: &str) -> Result<IssuedCode, AuthError> {
        let key = Self::key(email);
        if let Some(code) = self.store.get(&key).await? {
            return Ok(IssuedCode { code, fresh: false });
        }

        let code = generate_verification_code();
        self.store.set(&key, &code, self.code_ttl).await?;
        Ok(IssuedCode { code, fresh: true })
    }

    /// Check a candidate code against the stored one
    ///
    /// A missing or expired entry reads as [`AuthError::CodeExpired`]; the
    /// two states are indistinguishable once the store has dropped the key.
    /// Checking does not consume the code.
    pub async fn check(&self, email: &str, candidate: &str) -> Result<(), AuthError> {
        let stored = self
            .store
            .get(&Self::key(email))
            .await?
            .ok_or(AuthError::CodeExpired)?;

        if stored != candidate {
            return Err(AuthError::CodeMismatch);
        }
        Ok(())
    }

    /// Drop the code for this email; absent entries are fine
    pub async fn invalidate(&self, email: &str) -> Result<(), AuthError> {
        self.store.del(&Self::key(email)).await?;
        Ok(())
    }
}
