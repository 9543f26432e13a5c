//! Media Module
//!
//! Seam over the media storage service that hosts audio files and cover
//! artwork. Uploads take a client-supplied source URL and return the stable
//! URL the catalog stores.

use async_trait::async_trait;
use thiserror::Error;

/// What kind of asset is being ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Image,
}

/// Media ingestion failure
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UploadError(pub String);

/// Media storage backend
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Ingest the asset at `source_url` and return its hosted URL
    async fn upload(&self, source_url: &str, kind: MediaKind) -> Result<String, UploadError>;
}

/// Uploader that trusts the source URL as already hosted
///
/// Used in development and tests, where there is no media service to push
/// assets through.
#[derive(Default)]
pub struct PassthroughUploader;

impl PassthroughUploader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaUploader for PassthroughUploader {
    async fn upload(&self, source_url: &str, kind: MediaKind) -> Result<String, UploadError> {
        log::debug!("passthrough upload of {:?} asset: {}", kind, source_url);
        Ok(source_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_returns_source_url() {
        let uploader = PassthroughUploader::new();
        let url = uploader
            .upload("https://cdn.example.com/raw/a.mp3", MediaKind::Audio)
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/raw/a.mp3");
    }
}
