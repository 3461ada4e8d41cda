use crate::extractor::models::RawMetadata;
use crate::utils::error::RelayError;
use async_trait::async_trait;

/// Source of raw video metadata
///
/// This trait isolates the pipeline from the way metadata is obtained
/// (the yt-dlp process in production, canned documents in tests).
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Returns a unique identifier for this fetcher (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Fetch the raw metadata document for a validated URL
    async fn fetch(&self, url: &str) -> Result<RawMetadata, RelayError>;
}
