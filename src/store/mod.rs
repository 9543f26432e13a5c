//! Storage Module
//!
//! Trait seams over the backing stores plus the Postgres, Redis, and
//! in-memory implementations. Services depend only on the traits here, so
//! deployments and tests choose their own backends.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::track::{NewTrack, TrackRecord};
use crate::models::user::{NewUser, UserRecord};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::{MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository};
pub use postgres::{DatabaseConfig, PgTrackRepository, PgUserRepository};
pub use redis::RedisStore;

/// Which unique account field a write collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Email,
    Username,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Email => write!(f, "email"),
            ConflictField::Username => write!(f, "username"),
        }
    }
}

/// Errors surfaced by the storage layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("duplicate {0}")]
    Duplicate(ConflictField),

    /// The row targeted by an update does not exist
    #[error("record not found")]
    NotFound,

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Underlying cache failure
    #[error("cache error: {0}")]
    Cache(#[from] ::redis::RedisError),
}

/// Account storage
///
/// Uniqueness of email and username is enforced here, not by callers.
/// Pre-checks in the services are early exits only; under a race the
/// implementation must reject the second write with
/// [`StoreError::Duplicate`] naming the colliding field.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find an account matching either the email or the username
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Find an account by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Find the account holding an outstanding reset token
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Create a verified account
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Replace the stored row for this account in a single atomic write
    async fn update(&self, user: &UserRecord) -> Result<(), StoreError>;
}

/// Key-value storage with per-entry expiry, used for verification codes
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Fetch a live value; expired or absent keys both come back as None
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is not an error
    async fn del(&self, key: &str) -> Result<(), StoreError>;
}

/// Track storage
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// List every track, newest first
    async fn list(&self) -> Result<Vec<TrackRecord>, StoreError>;

    /// Store a new track
    async fn create(&self, track: NewTrack) -> Result<TrackRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_field_display() {
        assert_eq!(ConflictField::Email.to_string(), "email");
        assert_eq!(ConflictField::Username.to_string(), "username");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Duplicate(ConflictField::Username);
        assert_eq!(err.to_string(), "duplicate username");
    }
}
