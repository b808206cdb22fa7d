//! Capability traits the benchmark engine consumes
//!
//! The engine never touches a wire format directly: it drives an abstract
//! connection pair plus a one-time request builder. Concrete implementations
//! live in `thriftmark-wire`, which depends on this crate for the contracts
//! (the traits are defined here to avoid circular dependencies).

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use crate::metrics::ErrorKind;

/// Classification of one consumed reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The server answered with a normal result
    Success,
    /// The server answered with an application exception of the given kind
    Exception(ErrorKind),
}

/// One open transport connection a worker replays requests over
///
/// A worker owns exactly one connection for its lifetime; dropping the
/// connection closes it on every exit path.
#[async_trait]
pub trait Connection: Send {
    /// Write one precomputed request verbatim.
    async fn send_request(&mut self, request: &[u8]) -> Result<(), TransportError>;

    /// Consume exactly one reply through the protocol layer and classify it.
    ///
    /// The reply body itself is irrelevant to the benchmark; only whether the
    /// server produced a normal result or an application exception matters.
    async fn read_reply(&mut self) -> Result<ReplyOutcome, TransportError>;
}

/// Produces ready-to-use connections to the target address
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a new connection.
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError>;
}

/// Builds the exact byte sequence of one fully-encoded request
///
/// Deterministic: identical inputs produce identical bytes. The orchestrator
/// invokes this exactly once per run and every worker replays the result
/// verbatim, so the benchmark measures the cost of a fixed request.
pub trait RequestBuilder: Send + Sync {
    /// Encode the request.
    fn build(&self) -> Result<Bytes, SchemaError>;
}

/// Transport-level failures
///
/// Fatal to the worker that owns the connection: the worker stops without
/// consuming further work, and the process keeps running. The one exception
/// is the pre-flight probe, where a connectivity failure aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not open a connection
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Target address
        addr: String,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Could not write the request bytes
    #[error("failed to write request: {0}")]
    Write(#[source] std::io::Error),

    /// Could not read the reply
    #[error("failed to read reply: {0}")]
    Read(#[source] std::io::Error),

    /// The reply did not parse as a protocol message
    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// Schema and case-definition failures
///
/// Always fatal, and always raised before any connection is opened.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema or case file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The schema or case source did not parse
    #[error("invalid schema: {0}")]
    Parse(String),

    /// The named case is not defined
    #[error("unknown case: {0}")]
    UnknownCase(String),

    /// The case references a method the schema does not define
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The schema declares an argument type the builder cannot encode
    #[error("unsupported argument type: {0}")]
    UnsupportedType(String),

    /// A case value does not fit the schema's declared type
    #[error("invalid value for argument {0}")]
    BadValue(String),

    /// An argument required by the schema is missing from the case
    #[error("missing value for argument {0}")]
    MissingValue(String),
}
