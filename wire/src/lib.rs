//! thriftmark-wire: the Thrift binary wire client
//!
//! Concrete implementations of the `thriftmark-core` capability traits:
//!
//! - A strict binary protocol codec (call encoding, reply skipping,
//!   application-exception classification)
//! - A TCP connection factory with buffered and framed wrappers
//! - The one-time request builder driven by a Thrift-IDL subset schema and
//!   JSON case definitions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary;
pub mod builder;
pub mod case;
pub mod schema;
pub mod transport;

pub use binary::{MessageReader, MessageType, MessageWriter, TType};
pub use builder::CaseRequestBuilder;
pub use case::{ApiCase, CaseFile};
pub use schema::{FieldSchema, MethodSchema, ServiceSchema};
pub use transport::{SocketConnection, SocketFactory};
