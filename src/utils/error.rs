//! Error handling for the relay

use std::time::Duration;
use thiserror::Error;

/// Main error type for the relay pipeline
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing URL")]
    MissingUrl,

    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp invocation failed: {0}")]
    FetchFailed(String),

    #[error("yt-dlp did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used when translating errors for clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the caller
    Validation,
    /// The extraction tool failed, timed out or could not be started
    Upstream,
    /// The extraction tool produced output that is not valid metadata
    Parse,
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::MissingUrl | RelayError::InvalidUrl(_) => ErrorKind::Validation,
            RelayError::Parse(_) => ErrorKind::Parse,
            RelayError::YtDlpNotFound
            | RelayError::FetchFailed(_)
            | RelayError::Timeout(_)
            | RelayError::Io(_) => ErrorKind::Upstream,
        }
    }

    /// Message that is safe to hand back to a client.
    ///
    /// Upstream detail (stderr, paths, exit codes) never leaves the process.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::MissingUrl => "Missing URL",
            RelayError::InvalidUrl(_) => "Invalid YouTube URL",
            RelayError::Parse(_) => "Parse error",
            _ => "Failed to fetch formats",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(RelayError::MissingUrl.kind(), ErrorKind::Validation);
        assert_eq!(
            RelayError::InvalidUrl("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RelayError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Upstream
        );
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(RelayError::from(parse).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_public_message_hides_detail() {
        let err = RelayError::FetchFailed("ERROR: secret stderr".into());
        assert_eq!(err.public_message(), "Failed to fetch formats");
        assert!(!err.public_message().contains("secret"));
    }
}
