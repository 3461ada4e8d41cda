//! Filtering and reshaping of the raw yt-dlp format list

use crate::extractor::models::{NormalizedFormat, RawFormat, RawMetadata, VideoInfo};
use crate::utils::config::FormatPolicy;
use std::cmp::Reverse;

/// Codec value yt-dlp uses for an absent stream
const NO_CODEC: &str = "none";
/// Marker of HLS manifests, which are playlists rather than files
const MANIFEST_MARKER: &str = ".m3u8";
/// Container yt-dlp reports for storyboard thumbnail sheets
const STORYBOARD_EXT: &str = "mhtml";
/// Quality label for formats without a height
pub const FALLBACK_QUALITY: &str = "audio";

/// Build the client-facing [`VideoInfo`] from raw metadata.
///
/// Title and thumbnail pass through untouched.
pub fn normalize(meta: RawMetadata, policy: FormatPolicy) -> VideoInfo {
    VideoInfo {
        title: meta.title,
        thumbnail: meta.thumbnail,
        formats: normalize_formats(meta.formats, policy),
    }
}

/// Filter, map and sort a raw format list.
///
/// Output order: formats with audio first, then by height descending.
pub fn normalize_formats(formats: Vec<RawFormat>, policy: FormatPolicy) -> Vec<NormalizedFormat> {
    let mut out: Vec<NormalizedFormat> = formats
        .into_iter()
        .filter_map(|f| to_normalized(f, policy))
        .collect();

    // stable: equal keys keep upstream order
    out.sort_by_key(|f| (Reverse(f.has_audio), Reverse(quality_rank(&f.quality))));
    out
}

fn to_normalized(format: RawFormat, policy: FormatPolicy) -> Option<NormalizedFormat> {
    let url = format.url.filter(|u| !u.is_empty())?;
    if url.contains(MANIFEST_MARKER) || format.ext.as_deref() == Some(STORYBOARD_EXT) {
        return None;
    }

    let has_audio = has_stream(format.acodec.as_deref());
    let has_video = has_stream(format.vcodec.as_deref());
    let keep = match policy {
        FormatPolicy::AnyStream => has_audio || has_video,
        FormatPolicy::AudioAndVideo => has_audio && has_video,
    };
    if !keep {
        return None;
    }

    let quality = match format.height {
        Some(height) if height > 0 => format!("{height}p"),
        _ => FALLBACK_QUALITY.to_string(),
    };

    Some(NormalizedFormat {
        quality,
        ext: format.ext,
        has_audio,
        has_video,
        acodec: format.acodec,
        vcodec: format.vcodec,
        url,
    })
}

/// A missing codec field is not the "none" sentinel, so it counts as present.
fn has_stream(codec: Option<&str>) -> bool {
    codec != Some(NO_CODEC)
}

/// Leading digits of a quality label, zero when there are none
fn quality_rank(quality: &str) -> u32 {
    let digits: String = quality.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, ext: &str, height: Option<u32>, acodec: &str, vcodec: &str) -> RawFormat {
        RawFormat {
            url: Some(url.to_string()),
            ext: Some(ext.to_string()),
            height,
            acodec: Some(acodec.to_string()),
            vcodec: Some(vcodec.to_string()),
        }
    }

    #[test]
    fn test_excludes_missing_url_manifests_and_storyboards() {
        let formats = vec![
            RawFormat {
                url: None,
                ..raw("", "mp4", Some(720), "aac", "avc1")
            },
            raw("", "mp4", Some(720), "aac", "avc1"),
            raw("https://cdn/x/index.m3u8", "mp4", Some(1080), "aac", "avc1"),
            raw("https://cdn/sb", "mhtml", Some(90), "aac", "avc1"),
            raw("https://cdn/ok", "webm", Some(480), "opus", "vp9"),
        ];

        let out = normalize_formats(formats, FormatPolicy::AnyStream);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://cdn/ok");
    }

    #[test]
    fn test_excludes_formats_without_any_stream() {
        let out = normalize_formats(
            vec![raw("u", "mp4", Some(720), "none", "none")],
            FormatPolicy::AnyStream,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_audio_first_then_height() {
        let formats = vec![
            raw("u720", "mp4", Some(720), "none", "avc1"),
            raw("u480", "mp4", Some(480), "aac", "avc1"),
        ];
        let out = normalize_formats(formats, FormatPolicy::AnyStream);
        let urls: Vec<_> = out.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["u480", "u720"]);
    }

    #[test]
    fn test_sort_orders_audio_only_last_within_audio_group() {
        let formats = vec![
            raw("audio", "m4a", None, "mp4a", "none"),
            raw("u360", "mp4", Some(360), "aac", "avc1"),
            raw("u1080", "webm", Some(1080), "none", "vp9"),
            raw("u720", "mp4", Some(720), "aac", "avc1"),
        ];
        let out = normalize_formats(formats, FormatPolicy::AnyStream);
        let urls: Vec<_> = out.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["u720", "u360", "audio", "u1080"]);
    }

    #[test]
    fn test_map_fields() {
        let out = normalize_formats(
            vec![
                raw("a", "m4a", None, "mp4a.40.2", "none"),
                raw("v", "mp4", Some(1440), "none", "avc1"),
            ],
            FormatPolicy::AnyStream,
        );

        let video = &out[1];
        assert_eq!(video.quality, "1440p");
        assert!(video.has_video);
        assert!(!video.has_audio);
        assert_eq!(video.vcodec.as_deref(), Some("avc1"));

        let audio = &out[0];
        assert_eq!(audio.quality, FALLBACK_QUALITY);
        assert!(audio.has_audio);
        assert!(!audio.has_video);
        assert_eq!(audio.ext.as_deref(), Some("m4a"));
        assert_eq!(audio.acodec.as_deref(), Some("mp4a.40.2"));
    }

    #[test]
    fn test_missing_codec_counts_as_present() {
        let out = normalize_formats(
            vec![RawFormat {
                url: Some("u".to_string()),
                ext: Some("mp4".to_string()),
                height: Some(240),
                acodec: None,
                vcodec: None,
            }],
            FormatPolicy::AudioAndVideo,
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].has_audio && out[0].has_video);
    }

    #[test]
    fn test_audio_and_video_policy() {
        let formats = vec![
            raw("muxed360", "mp4", Some(360), "aac", "avc1"),
            raw("video", "mp4", Some(1080), "none", "avc1"),
            raw("audio", "m4a", None, "aac", "none"),
            raw("muxed720", "mp4", Some(720), "aac", "avc1"),
        ];
        let out = normalize_formats(formats, FormatPolicy::AudioAndVideo);
        let urls: Vec<_> = out.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["muxed720", "muxed360"]);
    }

    #[test]
    fn test_normalize_passes_title_and_thumbnail_through() {
        let meta = RawMetadata {
            title: Some("T".to_string()),
            thumbnail: Some("thumb.jpg".to_string()),
            formats: Vec::new(),
        };
        let info = normalize(meta, FormatPolicy::AnyStream);
        assert_eq!(info.title.as_deref(), Some("T"));
        assert_eq!(info.thumbnail.as_deref(), Some("thumb.jpg"));
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_quality_rank() {
        assert_eq!(quality_rank("720p"), 720);
        assert_eq!(quality_rank("audio"), 0);
        assert_eq!(quality_rank(""), 0);
    }
}
