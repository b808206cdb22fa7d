//! Error types for thriftmark-core

use crate::config::ConfigError;
use crate::traits::{SchemaError, TransportError};

/// Core error type
///
/// Everything that can abort a run before or outside the worker loops.
/// Per-call server exceptions are data (see [`crate::metrics::ErrorKind`]),
/// never an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid run configuration, rejected before the run starts
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema or case sources rejected before any connection is opened
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Transport failure outside worker scope (e.g. the pre-flight probe)
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A required component was not supplied to a builder
    #[error("missing component: {0}")]
    MissingComponent(&'static str),

    /// A background task failed to join
    #[error("task error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
