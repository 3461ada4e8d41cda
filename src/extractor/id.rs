//! Canonical video identifiers derived from user-supplied URLs

use std::fmt;
use url::Url;

/// Host token identifying the short-link domain
const SHORT_LINK_HOST: &str = "youtu.be";

/// Canonical per-video key, used to index the result cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the video identifier from a URL.
///
/// Shapes are tried in order, first match wins:
/// 1. short link host (`youtu.be/<id>`)
/// 2. `v` query parameter (`/watch?v=<id>`)
/// 3. `/shorts/<id>` path
///
/// Returns `None` for unparseable URLs and for URLs matching no shape.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let url = Url::parse(input.trim()).ok()?;

    let host = url.host_str().unwrap_or("").to_ascii_lowercase();
    if host.contains(SHORT_LINK_HOST) {
        let id = url.path().trim_start_matches('/');
        return non_empty(id);
    }

    if let Some(id) = url
        .query_pairs()
        .find_map(|(key, value)| (key == "v").then(|| value.into_owned()))
    {
        return non_empty(&id);
    }

    let mut segments = url.path_segments()?;
    if segments.next() == Some("shorts") {
        return segments.next().and_then(non_empty);
    }

    None
}

fn non_empty(id: &str) -> Option<VideoId> {
    (!id.is_empty()).then(|| VideoId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(input: &str) -> Option<String> {
        extract_video_id(input).map(|v| v.as_str().to_string())
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            id("https://m.youtube.com/watch?feature=share&v=abc123&t=10"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_short_link() {
        assert_eq!(id("https://youtu.be/abc123"), Some("abc123".to_string()));
        assert_eq!(
            id("https://youtu.be/abc123?si=tracking"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_short_link_wins_over_query() {
        assert_eq!(
            id("https://youtu.be/abc123?v=other"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_shorts_path() {
        assert_eq!(
            id("https://www.youtube.com/shorts/xyz789"),
            Some("xyz789".to_string())
        );
        assert_eq!(
            id("https://www.youtube.com/shorts/xyz789/extra"),
            Some("xyz789".to_string())
        );
    }

    #[test]
    fn test_query_wins_over_shorts_path() {
        assert_eq!(
            id("https://www.youtube.com/shorts/xyz789?v=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert_eq!(id("https://www.youtube.com"), None);
        assert_eq!(id("https://www.youtube.com/"), None);
        assert_eq!(id("https://www.youtube.com/channel/UC123"), None);
        assert_eq!(id("https://www.youtube.com/shorts/"), None);
        assert_eq!(id("https://www.youtube.com/watch?v="), None);
        assert_eq!(id("https://youtu.be/"), None);
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(id("not a url"), None);
        assert_eq!(id(""), None);
        assert_eq!(id("youtube.com/watch?v=abc123"), None);
    }
}
