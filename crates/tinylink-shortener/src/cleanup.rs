use jiff::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tinylink_core::{PeriodicTask, Shortener};
use tracing::{debug, info, warn};

/// Default period between two cleanup runs.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically removes mappings whose expiry has passed.
///
/// Each run calls [`Shortener::cleanup_expired`] with the current time.
/// Failures are logged and the next run proceeds as scheduled.
pub fn spawn_cleanup<S>(shortener: Arc<S>, period: Duration) -> PeriodicTask
where
    S: Shortener + ?Sized,
{
    PeriodicTask::spawn("expired-cleanup", period, move || {
        let shortener = Arc::clone(&shortener);
        async move {
            match shortener.cleanup_expired(Timestamp::now()).await {
                Ok(0) => debug!("no expired mappings to clean up"),
                Ok(removed) => info!(removed, "cleaned up expired mappings"),
                Err(err) => warn!(error = %err, "expired mapping cleanup failed"),
            }
        }
    })
}
