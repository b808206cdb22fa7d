//! Builder pattern for Worker construction

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};

use crate::error::{Error, Result};
use crate::metrics::ErrorKind;
use crate::traits::ConnectionFactory;

use super::executor::Worker;
use super::WorkUnit;

/// Builder for creating Worker instances
///
/// Provides ergonomic construction with missing-field validation.
pub struct WorkerBuilder {
    id: usize,
    factory: Option<Arc<dyn ConnectionFactory>>,
    request: Option<Bytes>,
    queue: Option<Arc<Mutex<mpsc::Receiver<WorkUnit>>>>,
    latency_tx: Option<mpsc::Sender<u64>>,
    error_tx: Option<mpsc::Sender<ErrorKind>>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            factory: None,
            request: None,
            queue: None,
            latency_tx: None,
            error_tx: None,
        }
    }

    /// Set the connection factory.
    pub fn factory(mut self, factory: Arc<dyn ConnectionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the precomputed request bytes.
    pub fn request(mut self, request: Bytes) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the shared work queue.
    pub fn queue(mut self, queue: Arc<Mutex<mpsc::Receiver<WorkUnit>>>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Set the latency channel sender.
    pub fn latency_tx(mut self, tx: mpsc::Sender<u64>) -> Self {
        self.latency_tx = Some(tx);
        self
    }

    /// Set the error channel sender.
    pub fn error_tx(mut self, tx: mpsc::Sender<ErrorKind>) -> Self {
        self.error_tx = Some(tx);
        self
    }

    /// Build the Worker.
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> Result<Worker> {
        let factory = self.factory.ok_or(Error::MissingComponent("factory"))?;
        let request = self.request.ok_or(Error::MissingComponent("request"))?;
        let queue = self.queue.ok_or(Error::MissingComponent("queue"))?;
        let latency_tx = self
            .latency_tx
            .ok_or(Error::MissingComponent("latency_tx"))?;
        let error_tx = self.error_tx.ok_or(Error::MissingComponent("error_tx"))?;

        Ok(Worker::new(
            self.id, factory, request, queue, latency_tx, error_tx,
        ))
    }
}
