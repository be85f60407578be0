use crate::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tinylink_core::cache::Result;
use tinylink_core::{PeriodicTask, ShortCode, UrlCache};
use tokio::time::Instant;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone)]
struct CacheEntry {
    long_url: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Settings for [`SweepingUrlCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SweepingCacheSettings {
    /// Standard TTL reported by [`UrlCache::ttl`].
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
    /// Period of the background sweep started by
    /// [`SweepingUrlCache::spawn_sweeper`].
    #[builder(default = DEFAULT_SWEEP_INTERVAL)]
    pub sweep_interval: Duration,
}

/// An unbounded TTL cache over a sharded concurrent map.
///
/// Expired entries are never returned: `get` drops them on sight. Entries
/// nobody reads again are reclaimed by [`sweep`](Self::sweep), normally run
/// from the task returned by [`spawn_sweeper`](Self::spawn_sweeper).
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct SweepingUrlCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    sweep_interval: Duration,
}

impl SweepingUrlCache {
    pub fn new(settings: SweepingCacheSettings) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: settings.ttl,
            sweep_interval: settings.sweep_interval,
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry whose TTL has elapsed and returns how many went.
    ///
    /// Only one shard is locked at a time, and each removal re-checks the
    /// entry so a concurrent refresh is never thrown away.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();

        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        stale
            .into_iter()
            .filter(|key| {
                self.entries
                    .remove_if(key, |_, entry| entry.is_expired_at(now))
                    .is_some()
            })
            .count()
    }

    /// Starts the background sweep on the configured interval.
    ///
    /// The sweep runs until the returned task is shut down or dropped.
    pub fn spawn_sweeper(&self) -> PeriodicTask {
        let cache = self.clone();
        PeriodicTask::spawn("cache-sweeper", self.sweep_interval, move || {
            let cache = cache.clone();
            async move {
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "swept expired cache entries");
                }
            }
        })
    }
}

impl Default for SweepingUrlCache {
    fn default() -> Self {
        Self::new(SweepingCacheSettings::builder().build())
    }
}

#[async_trait]
impl UrlCache for SweepingUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        let key = code.key();
        let now = Instant::now();

        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired_at(now) {
                trace!(code = %code, "cache hit");
                return Ok(Some(entry.long_url.clone()));
            }
        }

        self.entries.remove_if(&key, |_, entry| entry.is_expired_at(now));
        trace!(code = %code, "cache miss");
        Ok(None)
    }

    async fn put(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let entry = CacheEntry {
            long_url: long_url.to_string(),
            // A TTL past what the clock can represent keeps the entry for a century.
            expires_at: now
                .checked_add(ttl)
                .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 60 * 60)),
        };
        self.entries.insert(code.key(), entry);
        trace!(code = %code, ttl = ?ttl, "cached long url");
        Ok(())
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        self.entries.remove(&code.key());
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
