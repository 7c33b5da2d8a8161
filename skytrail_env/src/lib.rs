//! SkyTrail Environment Abstraction Layer
//!
//! This crate isolates everything the player loop does not control:
//! - Time (`now()`, `sleep()`) and task spawning via [`FrameContext`]
//! - Where the flight recording comes from via [`FlightDataSource`]
//! - The one-shot asynchronous load via [`DataLoad`]
//!
//! # Example
//!
//! ```ignore
//! use skytrail_env::{DataLoad, FileSource, LoadPoll, TokioContext};
//!
//! let ctx = TokioContext::new();
//! let mut load = DataLoad::start(&ctx, FileSource::new("balloon_flight.json"));
//! loop {
//!     if let LoadPoll::Ready(samples) = load.poll() {
//!         playback.initialize(samples)?;
//!     }
//!     ctx.sleep(Duration::from_millis(16)).await;
//! }
//! ```

mod context;
mod error;
mod load;
mod source;
mod tokio_impl;

pub use context::FrameContext;
pub use error::EnvError;
pub use load::{DataLoad, LoadPoll};
pub use source::{FileSource, FlightDataSource, MemorySource};
pub use tokio_impl::TokioContext;
