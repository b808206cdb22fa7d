//! thriftmark - ab-style benchmarking for Thrift RPC services

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use thriftmark_core::OrchestratorBuilder;
use thriftmark_wire::{CaseRequestBuilder, SocketFactory};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.into_config().context("invalid configuration")?;

    let request_builder =
        CaseRequestBuilder::from_config(&config).context("failed to prepare the request")?;
    let factory = SocketFactory::new(config.addr.clone(), config.wrapper);

    println!("This is thriftmark, an RPC benchmarking tool");
    println!();
    println!("Benchmarking {} (be patient)......", config.addr);

    let addr = config.addr.clone();
    let orchestrator = OrchestratorBuilder::new()
        .config(config)
        .factory(Arc::new(factory))
        .request_builder(Arc::new(request_builder))
        .build()?;

    let report = orchestrator
        .run()
        .await
        .with_context(|| format!("benchmark against {addr} failed"))?;
    print!("{}", report.render());

    Ok(())
}
