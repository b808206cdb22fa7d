//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::channel::ChannelConfig;
use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::traits::{ConnectionFactory, RequestBuilder};

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with a validated configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .config(config)
///     .factory(Arc::new(factory))
///     .request_builder(Arc::new(builder))
///     .build()?;
/// let report = orchestrator.run().await?;
/// ```
pub struct OrchestratorBuilder {
    config: BenchConfig,
    factory: Option<Arc<dyn ConnectionFactory>>,
    builder: Option<Arc<dyn RequestBuilder>>,
    channels: Option<ChannelConfig>,
    preflight: bool,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: BenchConfig::default(),
            factory: None,
            builder: None,
            channels: None,
            preflight: true,
        }
    }

    /// Set the run configuration.
    pub fn config(mut self, config: BenchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the connection factory.
    pub fn factory(mut self, factory: Arc<dyn ConnectionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the one-time request builder.
    pub fn request_builder(mut self, builder: Arc<dyn RequestBuilder>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Override the channel sizing (defaults derive from the concurrency).
    pub fn channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Enable or disable the single pre-flight probe call (default: enabled).
    pub fn preflight(mut self, preflight: bool) -> Self {
        self.preflight = preflight;
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory or request builder are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> Result<Orchestrator> {
        let factory = self.factory.ok_or(Error::MissingComponent("factory"))?;
        let builder = self
            .builder
            .ok_or(Error::MissingComponent("request_builder"))?;

        self.config.validate()?;
        let channels = self
            .channels
            .unwrap_or_else(|| ChannelConfig::for_concurrency(self.config.concurrency));

        Ok(Orchestrator {
            config: self.config,
            factory,
            builder,
            channels,
            preflight: self.preflight,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
