//! Track Model
//!
//! Data structures for the track catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored track row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackRecord {
    /// Unique identifier for the track
    pub id: Uuid,

    /// Track title
    pub title: String,

    /// Credited artist name
    pub artist: String,

    /// Track length as the client submitted it, e.g. "3:42"
    pub duration: String,

    /// Optional URL of the cover artwork
    pub cover_image_url: Option<String>,

    /// URL of the uploaded audio file
    pub audio_file_url: String,

    /// User who uploaded the track
    pub author_id: Uuid,

    /// Timestamp when the track was uploaded
    pub created_at: DateTime<Utc>,
}

/// Fields required to store a new track
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub cover_image_url: Option<String>,
    pub audio_file_url: String,
    pub author_id: Uuid,
}

/// Track representation for external API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackView {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub cover_image_url: Option<String>,
    pub audio_file_url: String,
    pub author_name: String,
    pub has_liked: bool,
}

impl TrackView {
    /// Build the API view of a stored track
    pub fn from_record(record: TrackRecord, author_name: &str, has_liked: bool) -> Self {
        Self {
            id: record.id,
            title: record.title,
            artist: record.artist,
            duration: record.duration,
            cover_image_url: record.cover_image_url,
            audio_file_url: record.audio_file_url,
            author_name: author_name.to_string(),
            has_liked,
        }
    }
}
