//! HTTP surface of the relay

pub mod error;

pub use error::ApiError;

use crate::extractor::VideoInfo;
use crate::service::InfoService;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Body of the liveness endpoint
pub const LIVENESS_MESSAGE: &str = "ShortsLoad Backend Running";

#[derive(Clone)]
pub struct AppState {
    service: Arc<InfoService>,
}

impl AppState {
    pub fn new(service: Arc<InfoService>) -> Self {
        Self { service }
    }
}

/// Build the router with CORS restricted to `allowed_origins` (any origin when empty)
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/getinfo", get(get_info))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET]);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// First `url` parameter of a query string.
///
/// Parsed by hand so malformed or repeated parameters still end in the JSON
/// error body rather than the extractor's plain-text rejection.
pub fn url_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

async fn get_info(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<VideoInfo>, ApiError> {
    let url = url_param(query.as_deref()).unwrap_or_default();
    let info = state.service.get_info(&url).await?;
    Ok(Json(info))
}
