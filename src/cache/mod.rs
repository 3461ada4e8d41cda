//! Time-bounded in-memory store of normalized results

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::extractor::{VideoId, VideoInfo};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Result cache keyed by video identifier
///
/// Entries expire lazily: an expired entry is treated as absent on read and
/// is dropped the next time it is touched or purged.
pub struct ResultCache {
    entries: Mutex<HashMap<VideoId, CacheEntry>>,
    ttl: Duration,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
}

struct CacheEntry {
    info: VideoInfo,
    expires_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

impl ResultCache {
    /// Create a cache using the wall clock
    pub fn new(ttl: std::time::Duration, max_entries: Option<usize>) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(
        ttl: std::time::Duration,
        max_entries: Option<usize>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
            clock,
        }
    }

    /// Look up a live entry
    pub async fn get(&self, id: &VideoId) -> Option<VideoInfo> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        match entries.get_mut(id) {
            Some(entry) if entry.expires_at > now => {
                entry.last_access = now;
                Some(entry.info.clone())
            }
            Some(_) => {
                debug!("Cache entry for {} expired", id);
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Store a result with a fresh TTL starting now
    pub async fn set(&self, id: VideoId, info: VideoInfo) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        if let Some(max) = self.max_entries {
            if !entries.contains_key(&id) && entries.len() >= max {
                entries.retain(|_, entry| entry.expires_at > now);
                while entries.len() >= max {
                    let Some(oldest) = entries
                        .iter()
                        .min_by_key(|(_, entry)| entry.last_access)
                        .map(|(key, _)| key.clone())
                    else {
                        break;
                    };
                    debug!("Evicting least recently used entry {}", oldest);
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            id,
            CacheEntry {
                info,
                expires_at: self.deadline(now),
                last_access: now,
            },
        );
    }

    /// Expiry for an entry stored at `now`, saturating at the end of time
    fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
