use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// An in-process cache mapping short codes to long URLs.
///
/// The cache is a best-effort projection of the store, never the system of
/// record. Entries carry their own TTL, independent of the mapping's
/// business expiry.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the long URL for a code.
    ///
    /// Returns `Ok(None)` if the key is not cached or its TTL has elapsed.
    async fn get(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the long URL for a code, replacing any previous entry.
    async fn put(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;

    /// Remove the entry for a code.
    ///
    /// It is not an error if the key does not exist.
    async fn invalidate(&self, code: &ShortCode) -> Result<()>;

    /// The standard TTL configured for this cache instance.
    fn ttl(&self) -> Duration;
}
