//! CLI argument parsing

use std::path::PathBuf;

use clap::Parser;

use thriftmark_core::{BenchConfig, ConfigError};

/// ab-style benchmark client for Thrift RPC services
#[derive(Debug, Parser)]
#[command(name = "thriftmark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of requests to perform
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub requests: usize,

    /// Number of multiple requests to make at a time
    #[arg(short = 'c', long, default_value_t = 10)]
    pub concurrency: usize,

    /// Protocol factory
    #[arg(long, default_value = "binary")]
    pub protocol: String,

    /// Transport factory
    #[arg(long, default_value = "socket")]
    pub transport: String,

    /// Transport wrapper
    #[arg(long, default_value = "buffered")]
    pub wrapper: String,

    /// Multiplexed service name
    #[arg(long)]
    pub service: Option<String>,

    /// Path to the Thrift schema file
    #[arg(short = 'f', long)]
    pub thrift_file: Option<PathBuf>,

    /// Path to the case-definition file
    #[arg(long)]
    pub api_file: Option<PathBuf>,

    /// Case to replay (empty selects the built-in ping case)
    #[arg(long)]
    pub case: Option<String>,

    /// Raise log verbosity to debug
    #[arg(short, long)]
    pub verbose: bool,

    /// Server address
    #[arg(default_value = ":6000")]
    pub addr: String,
}

impl Cli {
    /// Validate the raw flags into an immutable run configuration.
    pub fn into_config(self) -> Result<BenchConfig, ConfigError> {
        let config = BenchConfig::new(self.addr)
            .with_requests(self.requests)
            .with_concurrency(self.concurrency)
            .with_protocol(self.protocol.parse()?)
            .with_transport(self.transport.parse()?)
            .with_wrapper(self.wrapper.parse()?)
            .with_service(self.service)
            .with_thrift_file(self.thrift_file)
            .with_api_file(self.api_file)
            .with_case(self.case);
        config.validate()?;
        Ok(config)
    }
}
