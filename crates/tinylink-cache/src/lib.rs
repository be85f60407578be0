//! Resolution caches for the Tinylink shortener.
//!
//! Both backends are in-process and unbounded by default:
//! [`SweepingUrlCache`] is a concurrent map cleaned by a periodic sweep,
//! [`MokaUrlCache`] delegates expiry and housekeeping to moka.

pub mod moka;
pub mod sweeping;

pub use self::moka::{MokaCacheSettings, MokaUrlCache};
pub use sweeping::{SweepingCacheSettings, SweepingUrlCache};
pub use tinylink_core::{CacheError, UrlCache};

use std::time::Duration;

/// Standard entry TTL when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often expired entries are swept when none is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
