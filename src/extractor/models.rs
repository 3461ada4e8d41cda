//! Data structures for video information

use serde::{Deserialize, Serialize};

/// Metadata document emitted by `yt-dlp -j`.
///
/// Only the fields the relay consumes are modelled; everything else in the
/// document is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub formats: Vec<RawFormat>,
}

/// One entry of the raw `formats` list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
}

/// Client-facing format entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFormat {
    pub quality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    pub url: String,
}

/// Normalized response body, the value stored in the result cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub formats: Vec<NormalizedFormat>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawFormat>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RawFormat>>::deserialize(deserializer)?.unwrap_or_default())
}
