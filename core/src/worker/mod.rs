//! Worker pool replaying the precomputed request
//!
//! Each worker is a tokio task with a deliberately small loop: **pull a work
//! unit -> replay the request -> publish the outcome -> repeat**. The worker
//! opens one connection at startup and keeps it for its whole lifetime; the
//! shared work queue closing after the last token is the only termination
//! signal.
//!
//! # Example
//!
//! ```ignore
//! let worker = WorkerBuilder::new(0)
//!     .factory(factory)
//!     .request(request.clone())
//!     .queue(queue)
//!     .latency_tx(latency_tx)
//!     .error_tx(error_tx)
//!     .build()?;
//!
//! let stats = tokio::spawn(worker.run()).await?;
//! println!("completed: {}", stats.completed);
//! ```

mod builder;
mod executor;
pub mod replay;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;

/// One ticket authorizing a worker to perform one request
///
/// Exactly `requests` units are produced per run. The unit carries a sequence
/// number for tracing only; workers never interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit(pub usize);
