//! Track Service Implementation
//!
//! Business logic for the track catalog: listing the feed and ingesting
//! uploads.

use std::sync::Arc;

use thiserror::Error;

use crate::media::{MediaKind, MediaUploader, UploadError};
use crate::models::requests::CreateTrackRequest;
use crate::models::session::Identity;
use crate::models::track::{NewTrack, TrackView};
use crate::store::{StoreError, TrackRepository};
use crate::utils::error::AppError;

/// Custom error types for the track service
#[derive(Error, Debug)]
pub enum TrackError {
    /// Upload attempted without a logged-in user
    #[error("Please login or signup first")]
    Unauthenticated,

    /// Media storage rejected the asset
    #[error("Media upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl From<TrackError> for AppError {
    fn from(err: TrackError) -> Self {
        match err {
            TrackError::Unauthenticated => {
                AppError::Authentication("Please login or signup first".to_string())
            }
            TrackError::Upload(e) => AppError::ExternalService(e.to_string()),
            TrackError::StorageError(_) => {
                AppError::Internal("A storage error occurred".to_string())
            }
        }
    }
}

/// Result type for track service operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Track catalog service
pub struct TrackService {
    /// Track storage
    tracks: Arc<dyn TrackRepository>,

    /// Media storage backend for audio and artwork
    uploader: Arc<dyn MediaUploader>,
}

impl TrackService {
    /// Create a new track service
    pub fn new(tracks: Arc<dyn TrackRepository>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { tracks, uploader }
    }

    /// List the feed, newest uploads first
    pub async fn feed(&self) -> TrackResult<Vec<TrackView>> {
        let records = self.tracks.list().await?;

        // Likes and author joins are not modeled yet
        Ok(records
            .into_iter()
            .map(|record| TrackView::from_record(record, "me", true))
            .collect())
    }

    /// Ingest a new track for the logged-in user
    ///
    /// The audio file is pushed through media storage first; the catalog
    /// row stores the hosted URLs, never the client-supplied ones.
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        request: CreateTrackRequest,
    ) -> TrackResult<TrackView> {
        let identity = identity.ok_or(TrackError::Unauthenticated)?;

        let audio_file_url = self
            .uploader
            .upload(&request.audio_file_url, MediaKind::Audio)
            .await?;

        let cover_image_url = match request.cover_image_url.as_deref() {
            Some(url) if !url.is_empty() => {
                Some(self.uploader.upload(url, MediaKind::Image).await?)
            }
            _ => None,
        };

        let record = self
            .tracks
            .create(NewTrack {
                title: request.title,
                artist: request.artist,
                duration: request.duration,
                cover_image_url,
                audio_file_url,
                author_id: identity.user_id,
            })
            .await?;

        Ok(TrackView::from_record(record, &identity.username, false))
    }
}
