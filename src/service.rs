//! Request pipeline: identifier → cache → fetch → normalize → cache

use crate::cache::ResultCache;
use crate::extractor::{extract_video_id, normalize, MetadataFetcher, VideoId, VideoInfo};
use crate::utils::config::FormatPolicy;
use crate::utils::error::RelayError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Resolves video URLs into normalized, cached format listings
///
/// Concurrent misses for the same identifier are coalesced: the first caller
/// runs the fetch while the others wait on the same per-identifier lock and
/// then read the freshly stored result.
pub struct InfoService {
    fetcher: Arc<dyn MetadataFetcher>,
    cache: ResultCache,
    policy: FormatPolicy,
    in_flight: InFlight,
}

type InFlight = SyncMutex<HashMap<VideoId, Arc<Mutex<()>>>>;

impl InfoService {
    pub fn new(fetcher: Arc<dyn MetadataFetcher>, cache: ResultCache, policy: FormatPolicy) -> Self {
        Self {
            fetcher,
            cache,
            policy,
            in_flight: SyncMutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn policy(&self) -> FormatPolicy {
        self.policy
    }

    /// Resolve a URL into a [`VideoInfo`], serving from cache when possible
    pub async fn get_info(&self, url: &str) -> Result<VideoInfo, RelayError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RelayError::MissingUrl);
        }

        let Some(id) = extract_video_id(url) else {
            warn!("Rejected URL without a recognizable video id: {}", url);
            return Err(RelayError::InvalidUrl(url.to_string()));
        };
        debug!("Resolved {} to video id {}", url, id);

        if let Some(info) = self.cache.get(&id).await {
            info!("Cache hit for {}", id);
            return Ok(info);
        }

        // declared before the lock so it is dropped after it, even on cancellation
        let slot = SlotGuard::acquire(&self.in_flight, &id);
        let _lock = slot.lock().lock_owned().await;
        self.fetch_and_store(&id, url).await
    }

    async fn fetch_and_store(&self, id: &VideoId, url: &str) -> Result<VideoInfo, RelayError> {
        // another caller may have filled the entry while we waited
        if let Some(info) = self.cache.get(id).await {
            debug!("Cache filled by concurrent request for {}", id);
            return Ok(info);
        }

        debug!("Cache miss for {}, invoking {}", id, self.fetcher.id());
        let meta = self.fetcher.fetch(url).await?;
        let info = normalize(meta, self.policy);

        info!("Caching {} formats for {}", info.formats.len(), id);
        self.cache.set(id.clone(), info.clone()).await;
        Ok(info)
    }
}

/// Per-identifier lock handle, unregistered from the in-flight map on drop
/// once no other request holds it.
struct SlotGuard<'a> {
    in_flight: &'a InFlight,
    id: VideoId,
    slot: Arc<Mutex<()>>,
}

impl<'a> SlotGuard<'a> {
    fn acquire(in_flight: &'a InFlight, id: &VideoId) -> Self {
        let mut map = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        let slot = map.entry(id.clone()).or_default().clone();
        Self {
            in_flight,
            id: id.clone(),
            slot,
        }
    }

    fn lock(&self) -> Arc<Mutex<()>> {
        self.slot.clone()
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // held only by the map and this guard: nobody else is waiting
        let idle = map
            .get(&self.id)
            .is_some_and(|s| Arc::ptr_eq(s, &self.slot) && Arc::strong_count(s) == 2);
        if idle {
            map.remove(&self.id);
        }
    }
}
