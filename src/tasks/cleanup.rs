//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from every
//! namespace. Reads already expire entries lazily; the sweep bounds memory
//! for keys that are written and never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a background task that sweeps the registry every `interval`.
///
/// The returned handle is the only way to stop the task; abort it during
/// shutdown.
///
/// # Example
/// ```ignore
/// let registry = CacheRegistry::new(&RegistryConfig::default())?;
/// let cleanup_handle = spawn_cleanup_task(registry.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(registry: CacheRegistry, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = registry.cleanup_all();
            if report.total() > 0 {
                info!(
                    api = report.api,
                    ui = report.ui,
                    data = report.data,
                    "TTL cleanup: removed {} expired entries",
                    report.total()
                );
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
