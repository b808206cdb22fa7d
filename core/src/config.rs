//! Benchmark run configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for one benchmark run
///
/// Built once from CLI input, validated, then passed by value into the
/// orchestrator. Nothing reads flag state ambiently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Target server address
    pub addr: String,

    /// Total number of requests to perform
    pub requests: usize,

    /// Number of concurrent workers, each owning one connection
    pub concurrency: usize,

    /// Protocol factory selection
    pub protocol: ProtocolKind,

    /// Transport factory selection
    pub transport: TransportKind,

    /// Transport wrapper selection
    pub wrapper: Wrapper,

    /// Multiplexed service name; `None` applies no multiplexing wrapper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Path to the Thrift schema source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thrift_file: Option<PathBuf>,

    /// Path to the case-definition file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_file: Option<PathBuf>,

    /// Named case to replay; `None` selects the built-in ping case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6000".to_string(),
            requests: 1000,
            concurrency: 10,
            protocol: ProtocolKind::Binary,
            transport: TransportKind::Socket,
            wrapper: Wrapper::Buffered,
            service: None,
            thrift_file: None,
            api_file: None,
            case_name: None,
        }
    }
}

impl BenchConfig {
    /// Create a config targeting the given address.
    ///
    /// A leading-colon address (`:6000`) is normalized to loopback.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let addr = if addr.starts_with(':') {
            format!("127.0.0.1{addr}")
        } else {
            addr
        };
        Self {
            addr,
            ..Default::default()
        }
    }

    /// Set the total request count
    pub fn with_requests(mut self, requests: usize) -> Self {
        self.requests = requests;
        self
    }

    /// Set the concurrency level
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the protocol selection
    pub fn with_protocol(mut self, protocol: ProtocolKind) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the transport selection
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Set the transport wrapper
    pub fn with_wrapper(mut self, wrapper: Wrapper) -> Self {
        self.wrapper = wrapper;
        self
    }

    /// Set the multiplexed service name (empty means none)
    pub fn with_service(mut self, service: Option<String>) -> Self {
        self.service = service.filter(|s| !s.is_empty());
        self
    }

    /// Set the schema source path
    pub fn with_thrift_file(mut self, path: Option<PathBuf>) -> Self {
        self.thrift_file = path;
        self
    }

    /// Set the case-definition path
    pub fn with_api_file(mut self, path: Option<PathBuf>) -> Self {
        self.api_file = path;
        self
    }

    /// Set the case name (empty means the built-in ping case)
    pub fn with_case(mut self, case_name: Option<String>) -> Self {
        self.case_name = case_name.filter(|c| !c.is_empty());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests == 0 {
            return Err(ConfigError::InvalidRequests);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Wire protocol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// Strict binary protocol
    Binary,
}

impl FromStr for ProtocolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(ProtocolKind::Binary),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Binary => f.write_str("binary"),
        }
    }
}

/// Stream transport family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Plain TCP socket
    Socket,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "socket" => Ok(TransportKind::Socket),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Socket => f.write_str("socket"),
        }
    }
}

/// Transport wrapper applied around the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrapper {
    /// Buffered reads and writes, no framing
    Buffered,
    /// 4-byte length-prefixed frames
    Framed,
}

impl FromStr for Wrapper {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buffered" => Ok(Wrapper::Buffered),
            "framed" => Ok(Wrapper::Framed),
            other => Err(ConfigError::UnknownWrapper(other.to_string())),
        }
    }
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wrapper::Buffered => f.write_str("buffered"),
            Wrapper::Framed => f.write_str("framed"),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Request count must be greater than zero
    #[error("invalid number of requests: must be greater than zero")]
    InvalidRequests,

    /// Concurrency must be greater than zero
    #[error("invalid concurrency: must be greater than zero")]
    InvalidConcurrency,

    /// Unknown protocol factory name
    #[error("unknown protocol factory: {0}")]
    UnknownProtocol(String),

    /// Unknown transport factory name
    #[error("unknown transport factory: {0}")]
    UnknownTransport(String),

    /// Unknown transport wrapper name
    #[error("unknown transport wrapper: {0}")]
    UnknownWrapper(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.requests, 1000);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.wrapper, Wrapper::Buffered);
        assert!(config.service.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_leading_colon_addr_normalized() {
        let config = BenchConfig::new(":6000");
        assert_eq!(config.addr, "127.0.0.1:6000");

        let config = BenchConfig::new("10.0.0.1:9090");
        assert_eq!(config.addr, "10.0.0.1:9090");
    }

    #[test]
    fn test_builder_pattern() {
        let config = BenchConfig::new(":6000")
            .with_requests(50)
            .with_concurrency(5)
            .with_wrapper(Wrapper::Framed)
            .with_service(Some("Revenue".to_string()));

        assert_eq!(config.requests, 50);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.wrapper, Wrapper::Framed);
        assert_eq!(config.service.as_deref(), Some("Revenue"));
    }

    #[test]
    fn test_empty_service_means_none() {
        let config = BenchConfig::new(":6000").with_service(Some(String::new()));
        assert!(config.service.is_none());
    }

    #[test]
    fn test_empty_case_means_ping_default() {
        let config = BenchConfig::new(":6000").with_case(Some(String::new()));
        assert!(config.case_name.is_none());
    }

    #[test]
    fn test_validation_zero_requests() {
        let config = BenchConfig::new(":6000").with_requests(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRequests)
        ));
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let config = BenchConfig::new(":6000").with_concurrency(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConcurrency)
        ));
    }

    #[test]
    fn test_wrapper_from_str() {
        assert_eq!("buffered".parse::<Wrapper>().unwrap(), Wrapper::Buffered);
        assert_eq!("framed".parse::<Wrapper>().unwrap(), Wrapper::Framed);
        assert!(matches!(
            "zigzag".parse::<Wrapper>(),
            Err(ConfigError::UnknownWrapper(_))
        ));
    }

    #[test]
    fn test_protocol_and_transport_from_str() {
        assert_eq!(
            "binary".parse::<ProtocolKind>().unwrap(),
            ProtocolKind::Binary
        );
        assert!("compact".parse::<ProtocolKind>().is_err());

        assert_eq!(
            "socket".parse::<TransportKind>().unwrap(),
            TransportKind::Socket
        );
        assert!("http".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = BenchConfig::new(":6000").with_requests(42);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"buffered\""));
        assert!(json.contains("\"requests\":42"));
    }
}
