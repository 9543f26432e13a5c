//! Security Utilities
//!
//! Password hashing and the random material behind verification codes and
//! password reset tokens.

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};

/// Default bcrypt work factor for new password hashes
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Number of random bytes behind a password reset token
pub const RESET_TOKEN_BYTES: usize = 20;

/// Generate a six digit numeric verification code
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100000..=999999).to_string()
}

/// Generate a password reset token as a hex string
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password at the default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password at an explicit bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its hash
///
/// A malformed or non-bcrypt hash counts as a failed match rather than an
/// error, so callers get a plain yes or no.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

/// Timestamp `duration_seconds` from now
pub fn create_expiration(duration_seconds: i64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(duration_seconds)
}

/// Whether `expiry` lies in the past
pub fn is_expired(expiry: DateTime<Utc>) -> bool {
    Utc::now() > expiry
}
