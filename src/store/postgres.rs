//! Postgres Storage
//!
//! SQLx-backed repositories plus connection pool configuration.

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::models::track::{NewTrack, TrackRecord};
use crate::models::user::{NewUser, UserRecord};

use super::{ConflictField, StoreError, TrackRepository, UserRepository};

/// Database configuration for connection setup
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/resonate".to_string(),
            max_connections: 20,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl DatabaseConfig {
    /// Create database configuration from environment variables
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let url = std::env::var("DATABASE_URL")?;

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let idle_timeout_secs = std::env::var("DB_IDLE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600);

        let max_lifetime_secs = std::env::var("DB_MAX_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            max_lifetime: Duration::from_secs(max_lifetime_secs),
        })
    }

    /// Create a database connection pool from this configuration
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

/// Postgres-backed user repository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation to the account field it names
fn map_user_write_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) => {
            if db_err.constraint() == Some("users_email_key") {
                StoreError::Duplicate(ConflictField::Email)
            } else if db_err.constraint() == Some("users_username_key") {
                StoreError::Duplicate(ConflictField::Username)
            } else {
                StoreError::Database(sqlx::Error::Database(db_err))
            }
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, full_name, email, password_hash, bio, profile_image_url,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, full_name, email, password_hash, bio, profile_image_url,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, full_name, email, password_hash, bio, profile_image_url,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM users
            WHERE reset_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, full_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, full_name, email, password_hash, bio, profile_image_url,
                      reset_token, reset_token_expires_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, full_name = $3, email = $4, password_hash = $5, bio = $6,
                profile_image_url = $7, reset_token = $8, reset_token_expires_at = $9,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.profile_image_url)
        .bind(&user.reset_token)
        .bind(&user.reset_token_expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Postgres-backed track repository
pub struct PgTrackRepository {
    pool: PgPool,
}

impl PgTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for PgTrackRepository {
    async fn list(&self) -> Result<Vec<TrackRecord>, StoreError> {
        let records = sqlx::query_as::<_, TrackRecord>(
            r#"
            SELECT id, title, artist, duration, cover_image_url, audio_file_url,
                   author_id, created_at
            FROM tracks
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn create(&self, track: NewTrack) -> Result<TrackRecord, StoreError> {
        let record = sqlx::query_as::<_, TrackRecord>(
            r#"
            INSERT INTO tracks (id, title, artist, duration, cover_image_url, audio_file_url, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, artist, duration, cover_image_url, audio_file_url,
                      author_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.duration)
        .bind(&track.cover_image_url)
        .bind(&track.audio_file_url)
        .bind(track.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
