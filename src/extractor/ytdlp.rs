//! yt-dlp wrapper for metadata extraction
//!
//! Runs `yt-dlp -j --no-warnings <url>` as a child process, collects both
//! output streams and parses the single JSON document written to stdout.

use crate::extractor::models::RawMetadata;
use crate::extractor::traits::MetadataFetcher;
use crate::utils::error::RelayError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Metadata fetcher backed by the yt-dlp binary
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    ytdlp_path: PathBuf,
    timeout: Duration,
}

impl YtDlpFetcher {
    /// Use an explicit binary, or discover one when `path` is `None`
    ///
    /// Search order:
    /// 1. Explicit path
    /// 2. System PATH
    /// 3. Common installation paths (Homebrew, pip, etc.)
    pub fn new(path: Option<PathBuf>, timeout: Duration) -> Result<Self, RelayError> {
        let ytdlp_path = match path.or_else(find_ytdlp) {
            Some(path) => {
                info!("Using yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(RelayError::YtDlpNotFound);
            }
        };

        Ok(Self::with_path(ytdlp_path, timeout))
    }

    /// Wrap a known binary without any lookup
    pub fn with_path(ytdlp_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            timeout,
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Report the tool version (`yt-dlp --version`)
    pub async fn version(&self) -> Result<String, RelayError> {
        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(RelayError::FetchFailed(format!(
                "--version exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl MetadataFetcher for YtDlpFetcher {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    async fn fetch(&self, url: &str) -> Result<RawMetadata, RelayError> {
        debug!("Extracting video info for URL: {}", url);

        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("-j")
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        // the child is killed when the timed-out future is dropped
        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("yt-dlp timed out after {:?} for {}", self.timeout, url);
                return Err(RelayError::Timeout(self.timeout));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            error!("yt-dlp extraction failed ({}): {}", output.status, stderr);
            return Err(RelayError::FetchFailed(format!(
                "exit status {}",
                output.status
            )));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            error!("yt-dlp produced no output: {}", stderr);
            return Err(RelayError::FetchFailed("empty output".to_string()));
        }

        serde_json::from_slice::<RawMetadata>(&output.stdout).map_err(|e| {
            error!("Failed to parse yt-dlp output: {} (stderr: {})", e, stderr);
            RelayError::Parse(e)
        })
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. System PATH
/// 2. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(system) = find_in_path() {
        debug!("Found yt-dlp in PATH: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Found yt-dlp in common path: {:?}", common);
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

/// Find yt-dlp in system PATH using `which`
fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|path| path.exists())
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // Homebrew (Intel) and manual installs
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // pip user install
        "~/.local/bin/yt-dlp",
    ];

    common_paths
        .iter()
        .map(|path_str| expand_home(path_str))
        .find(|path| path.exists() && is_executable(path))
}

fn expand_home(path_str: &str) -> PathBuf {
    match path_str.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path_str)),
        None => PathBuf::from(path_str),
    }
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
