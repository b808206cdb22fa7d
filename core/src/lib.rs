//! thriftmark-core: the concurrent benchmark engine
//!
//! This crate contains everything that coordinates a load-generation run,
//! independent of any wire format:
//!
//! - Run configuration and validation
//! - Capability traits for the protocol/transport pair and the one-time
//!   request builder (concrete implementations live in `thriftmark-wire`)
//! - The worker pool replaying a precomputed request over persistent
//!   connections
//! - The outcome collectors and the final statistical report
//! - The orchestrator wiring it all together with a two-phase shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod traits;
pub mod worker;

pub use channel::ChannelConfig;
pub use config::{BenchConfig, ConfigError, ProtocolKind, TransportKind, Wrapper};
pub use error::{Error, Result};
pub use metrics::{CallOutcome, ErrorHistogram, ErrorKind};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use report::BenchReport;
pub use traits::{
    Connection, ConnectionFactory, ReplyOutcome, RequestBuilder, SchemaError, TransportError,
};
pub use worker::{WorkUnit, Worker, WorkerBuilder, WorkerStats};
