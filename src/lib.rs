//! ShortsLoad relay library
//!
//! Turns a video URL into a normalized, cached list of downloadable formats
//! by way of yt-dlp.

pub mod cache;
pub mod extractor;
pub mod server;
pub mod service;
pub mod utils;

// Re-export main types for easier use
pub use cache::{Clock, ManualClock, ResultCache, SystemClock};
pub use extractor::{
    extract_video_id, MetadataFetcher, NormalizedFormat, RawFormat, RawMetadata, VideoId,
    VideoInfo, YtDlpFetcher,
};
pub use server::{router, AppState};
pub use service::InfoService;
pub use utils::{FormatPolicy, RelayError, RelaySettings};
