use crate::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tinylink_core::cache::Result;
use tinylink_core::{PeriodicTask, ShortCode, UrlCache};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// A cached long URL together with the TTL it was stored with.
#[derive(Debug, Clone)]
struct TimedUrl {
    long_url: String,
    ttl: Duration,
}

/// Expires each entry after its own TTL, restarting the clock on overwrite.
struct PerEntryTtl;

impl Expiry<String, TimedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Settings for [`MokaUrlCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MokaCacheSettings {
    /// Standard TTL reported by [`UrlCache::ttl`].
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
    /// Optional bound on the number of entries. Unbounded when unset.
    #[builder(default, setter(strip_option))]
    pub max_capacity: Option<u64>,
    /// Period of the housekeeping task started by
    /// [`MokaUrlCache::spawn_sweeper`].
    #[builder(default = DEFAULT_SWEEP_INTERVAL)]
    pub sweep_interval: Duration,
}

/// A resolution cache backed by moka.
///
/// Moka never returns an entry past its TTL; expired entries are reclaimed
/// during moka's own housekeeping, which
/// [`spawn_sweeper`](Self::spawn_sweeper) drives on a fixed period.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, TimedUrl>,
    ttl: Duration,
    sweep_interval: Duration,
}

impl MokaUrlCache {
    pub fn new(settings: MokaCacheSettings) -> Self {
        let mut builder = Cache::builder().expire_after(PerEntryTtl);

        if let Some(capacity) = settings.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            ttl: settings.ttl,
            sweep_interval: settings.sweep_interval,
        }
    }

    /// Approximate number of entries, as of the last housekeeping run.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs moka's pending housekeeping, evicting expired entries.
    pub async fn sweep(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Starts periodic housekeeping on the configured interval.
    pub fn spawn_sweeper(&self) -> PeriodicTask {
        let cache = self.clone();
        PeriodicTask::spawn("cache-sweeper", self.sweep_interval, move || {
            let cache = cache.clone();
            async move {
                cache.sweep().await;
                trace!(entries = cache.entry_count(), "moka housekeeping ran");
            }
        })
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new(MokaCacheSettings::builder().build())
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        match self.cache.get(&code.key()).await {
            Some(entry) => {
                trace!(code = %code, "cache hit in moka");
                Ok(Some(entry.long_url))
            }
            None => {
                trace!(code = %code, "cache miss in moka");
                Ok(None)
            }
        }
    }

    async fn put(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        let entry = TimedUrl {
            long_url: long_url.to_string(),
            ttl,
        };
        self.cache.insert(code.key(), entry).await;
        debug!(code = %code, ttl = ?ttl, "cached long url in moka");
        Ok(())
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(&code.key()).await;
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
