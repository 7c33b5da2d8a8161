//! One-shot asynchronous data load.
//!
//! The load is spawned on the [`FrameContext`] and delivered through a
//! oneshot channel. The frame loop polls it without blocking:
//!
//! ```text
//!   Unloaded ──poll() == Ready/Failed──► Settled
//! ```

use crate::context::FrameContext;
use crate::error::EnvError;
use crate::source::FlightDataSource;
use skytrail_core::FlightSample;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Outcome of a single non-blocking poll.
#[derive(Debug)]
pub enum LoadPoll {
    /// The source has not resolved yet
    Pending,
    /// Samples arrived (delivered exactly once)
    Ready(Vec<FlightSample>),
    /// The source failed (delivered exactly once)
    Failed(EnvError),
    /// A previous poll already delivered the outcome
    Settled,
}

type LoadResult = Result<Vec<FlightSample>, EnvError>;

/// Handle to an in-flight load.
pub struct DataLoad {
    rx: Option<oneshot::Receiver<LoadResult>>,
    source_name: String,
}

impl DataLoad {
    /// Spawns `source.load()` on `ctx` and returns a handle to poll.
    pub fn start<Ctx, S>(ctx: &Ctx, source: S) -> Self
    where
        Ctx: FrameContext,
        S: FlightDataSource,
    {
        let source_name = source.describe();
        let (tx, rx) = oneshot::channel();

        tracing::info!("Loading flight data from {}", source_name);
        ctx.spawn("flight-data-load", async move {
            let result = source.load().await;
            // Receiver gone means the player shut down first
            let _ = tx.send(result);
        });

        Self {
            rx: Some(rx),
            source_name,
        }
    }

    /// Name of the source being loaded.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns whether the outcome has already been delivered.
    pub fn is_settled(&self) -> bool {
        self.rx.is_none()
    }

    /// Checks for a result without blocking.
    pub fn poll(&mut self) -> LoadPoll {
        let Some(rx) = self.rx.as_mut() else {
            return LoadPoll::Settled;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.rx = None;
                match result {
                    Ok(samples) => LoadPoll::Ready(samples),
                    Err(e) => LoadPoll::Failed(e),
                }
            }
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            Err(TryRecvError::Closed) => {
                self.rx = None;
                LoadPoll::Failed(EnvError::SourceDropped(self.source_name.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::tokio_impl::TokioContext;
    use async_trait::async_trait;
    use std::time::Duration;

    async fn poll_until_settled(load: &mut DataLoad) -> LoadPoll {
        for _ in 0..200 {
            match load.poll() {
                LoadPoll::Pending => tokio::time::sleep(Duration::from_millis(5)).await,
                other => return other,
            }
        }
        LoadPoll::Pending
    }

    struct PanickingSource;

    #[async_trait]
    impl FlightDataSource for PanickingSource {
        async fn load(&self) -> Result<Vec<FlightSample>, EnvError> {
            panic!("sensor archive corrupted");
        }

        fn describe(&self) -> String {
            "panicking".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_delivers_once() {
        let ctx = TokioContext::new();
        let source = MemorySource::new(vec![FlightSample::new(0.0, 0.0, 0.0, 0.05)]);
        let mut load = DataLoad::start(&ctx, source);

        match poll_until_settled(&mut load).await {
            LoadPoll::Ready(samples) => assert_eq!(samples.len(), 1),
            other => panic!("expected samples, got {:?}", other),
        }
        assert!(load.is_settled());
        assert!(matches!(load.poll(), LoadPoll::Settled));
    }

    #[tokio::test]
    async fn test_dropped_task_reports_unavailable() {
        let ctx = TokioContext::new();
        let mut load = DataLoad::start(&ctx, PanickingSource);

        match poll_until_settled(&mut load).await {
            LoadPoll::Failed(EnvError::SourceDropped(name)) => assert_eq!(name, "panicking"),
            other => panic!("expected SourceDropped, got {:?}", other),
        }
    }
}
