//! ShortsLoad - video format relay
//!
//! Serves `GET /api/getinfo?url=...`, answering with the normalized yt-dlp
//! format list for the video, cached per video id.

use anyhow::{Context, Result};
use clap::Parser;
use shortsload::cache::ResultCache;
use shortsload::extractor::YtDlpFetcher;
use shortsload::server::{self, AppState};
use shortsload::service::InfoService;
use shortsload::utils::{FormatPolicy, RelaySettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shortsload", version, about)]
struct Args {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listening port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Comma separated origins allowed by CORS (any origin when empty)
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Seconds a resolved video stays cached
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 3600)]
    cache_ttl_secs: u64,

    /// Maximum number of cached videos
    #[arg(long, env = "CACHE_MAX_ENTRIES")]
    cache_max_entries: Option<usize>,

    /// Seconds allowed for a single yt-dlp run
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Path to the yt-dlp binary
    #[arg(long, env = "YTDLP_PATH")]
    ytdlp_path: Option<PathBuf>,

    /// Which formats are returned to clients
    #[arg(long, env = "FORMAT_POLICY", value_enum, default_value_t = FormatPolicy::AnyStream)]
    format_policy: FormatPolicy,
}

impl From<Args> for RelaySettings {
    fn from(args: Args) -> Self {
        RelaySettings {
            host: args.host,
            port: args.port,
            allowed_origins: args.allowed_origins,
            cache_ttl_secs: args.cache_ttl_secs,
            cache_max_entries: args.cache_max_entries,
            fetch_timeout_secs: args.fetch_timeout_secs,
            ytdlp_path: args.ytdlp_path,
            format_policy: args.format_policy,
        }
        .sanitized()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shortsload=info,tower_http=info")),
        )
        .init();

    let settings = RelaySettings::from(Args::parse());
    let fetcher = build_fetcher(&settings).await;

    let cache = ResultCache::new(settings.cache_ttl(), settings.cache_max_entries);
    let service = InfoService::new(Arc::new(fetcher), cache, settings.format_policy);
    let app = server::router(AppState::new(Arc::new(service)), &settings.allowed_origins);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        "Backend running on {} (cache ttl {}s, policy {})",
        addr,
        settings.cache_ttl_secs,
        settings.format_policy.as_str()
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Locate yt-dlp, warning rather than exiting when it is missing.
///
/// Requests will fail with an upstream error until the tool is installed.
async fn build_fetcher(settings: &RelaySettings) -> YtDlpFetcher {
    let timeout = settings.fetch_timeout();
    let fetcher = match YtDlpFetcher::new(settings.ytdlp_path.clone(), timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            warn!("{}; install it with `pip install yt-dlp` or set YTDLP_PATH", e);
            return YtDlpFetcher::with_path("yt-dlp", timeout);
        }
    };

    match fetcher.version().await {
        Ok(version) => info!("yt-dlp version {}", version),
        Err(e) => warn!("Could not query yt-dlp version: {}", e),
    }
    fetcher
}
