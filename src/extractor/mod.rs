pub mod id;
pub mod models;
pub mod normalize;
pub mod traits;
pub mod ytdlp;

pub use id::{extract_video_id, VideoId};
pub use models::{NormalizedFormat, RawFormat, RawMetadata, VideoInfo};
pub use normalize::normalize;
pub use traits::MetadataFetcher;
pub use ytdlp::YtDlpFetcher;
