//! Virtual clock implementing FrameContext for deterministic runs.

use async_trait::async_trait;
use skytrail_env::FrameContext;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Frame context backed by a virtual clock.
///
/// Time only moves when the player sleeps (or a test advances it), so a
/// playback run is reproducible frame for frame regardless of host speed.
pub struct VirtualClock {
    /// Current virtual time (nanoseconds since clock creation)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl VirtualClock {
    /// Creates a clock at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.lock();
        *time = time.saturating_add(duration.as_nanos() as u64);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u64> {
        // A poisoned counter is still a valid counter
        self.virtual_time_ns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualClock {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl FrameContext for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
        // Let spawned tasks (the data load) make progress
        tokio::task::yield_now().await;
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.to_string();
        tokio::spawn(async move {
            future.await;
            tracing::trace!("Task '{}' completed", name);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advance() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance_time(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(100));
        assert_eq!(clock.time_ns(), 100_000_000);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = VirtualClock::new();
        let other = clock.clone();
        clock.advance_time(Duration::from_secs(1));
        assert_eq!(other.now(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let clock = VirtualClock::new();
        clock.sleep(Duration::from_millis(16)).await;
        clock.sleep(Duration::from_millis(16)).await;
        assert_eq!(clock.now(), Duration::from_millis(32));
    }
}
