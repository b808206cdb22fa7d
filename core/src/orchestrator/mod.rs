//! Orchestration of a full benchmark run
//!
//! The orchestrator precomputes the request, spawns the collectors and the
//! worker pool, feeds exactly `requests` work units into the shared queue,
//! and enforces the two-phase shutdown: every worker's completion is observed
//! before the collectors can see their channels close.

mod builder;
mod collector;
mod executor;

pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;
