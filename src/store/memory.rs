//! In-Memory Storage
//!
//! Map-backed implementations of the storage traits. They power local
//! development without infrastructure and the test suites.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::track::{NewTrack, TrackRecord};
use crate::models::user::{NewUser, UserRecord};

use super::{ConflictField, ExpiringStore, StoreError, TrackRepository, UserRepository};

/// Vec-backed user repository
#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<Vec<UserRecord>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|row| row.email == email || row.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|row| row.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut rows = self.rows.write().await;

        // Uniqueness lives here, matching the database constraints
        if rows.iter().any(|row| row.email == user.email) {
            return Err(StoreError::Duplicate(ConflictField::Email));
        }
        if rows.iter().any(|row| row.username == user.username) {
            return Err(StoreError::Duplicate(ConflictField::Username));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            bio: None,
            profile_image_url: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|row| row.id == user.id)
            .ok_or(StoreError::NotFound)?;

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        *slot = updated;
        Ok(())
    }
}

/// HashMap-backed expiring key-value store
#[derive(Default)]
pub struct MemoryExpiringStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryExpiringStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpiringStore for MemoryExpiringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|(value, deadline)| {
            if Instant::now() < *deadline {
                Some(value.clone())
            } else {
                None
            }
        }))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// Vec-backed track repository
#[derive(Default)]
pub struct MemoryTrackRepository {
    rows: RwLock<Vec<TrackRecord>>,
}

impl MemoryTrackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackRepository for MemoryTrackRepository {
    async fn list(&self) -> Result<Vec<TrackRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().rev().cloned().collect())
    }

    async fn create(&self, track: NewTrack) -> Result<TrackRecord, StoreError> {
        let mut rows = self.rows.write().await;
        let record = TrackRecord {
            id: Uuid::new_v4(),
            title: track.title,
            artist: track.artist,
            duration: track.duration,
            cover_image_url: track.cover_image_url,
            audio_file_url: track.audio_file_url,
            author_id: track.author_id,
            created_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(record)
    }
}
