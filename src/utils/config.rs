//! Relay configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Interface to bind
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Origins allowed to call the API. Empty allows any origin.
    pub allowed_origins: Vec<String>,

    /// Lifetime of a cached result (seconds)
    pub cache_ttl_secs: u64,

    /// Upper bound on cached identifiers, unbounded when unset
    pub cache_max_entries: Option<usize>,

    /// Budget for a single yt-dlp invocation (seconds)
    pub fetch_timeout_secs: u64,

    /// Explicit yt-dlp binary, discovered when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Which formats survive normalization
    pub format_policy: FormatPolicy,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
            cache_ttl_secs: 3600, // 1 hour
            cache_max_entries: None,
            fetch_timeout_secs: 30,
            ytdlp_path: None,
            format_policy: FormatPolicy::AnyStream,
        }
    }
}

impl RelaySettings {
    /// Clamp values that would make the relay useless
    pub fn sanitized(mut self) -> Self {
        if self.cache_ttl_secs == 0 {
            self.cache_ttl_secs = 1;
        }
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = 1;
        }
        if self.cache_max_entries == Some(0) {
            self.cache_max_entries = Some(1);
        }
        self.allowed_origins = self
            .allowed_origins
            .into_iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// `host:port` pair for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Format filtering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatPolicy {
    /// Keep formats carrying audio, video, or both
    AnyStream,
    /// Keep only muxed formats carrying both audio and video
    AudioAndVideo,
}

impl FormatPolicy {
    /// Get string representation for display
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatPolicy::AnyStream => "any-stream",
            FormatPolicy::AudioAndVideo => "audio-and-video",
        }
    }
}
