//! Core environment context trait for the SkyTrail player.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the clock and task spawning so that the player loop
/// runs unchanged against real time (tokio) and a virtual clock (tests).
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Testing**: `VirtualClock` (in `skytrail_player`) - time advances only
///   when the loop sleeps
#[async_trait]
pub trait FrameContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Suspends the caller for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In a virtual clock: advances time and yields to the runtime
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
