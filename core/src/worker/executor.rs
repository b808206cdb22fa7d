//! Worker execution loop

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};

use crate::metrics::{CallOutcome, ErrorKind};
use crate::traits::ConnectionFactory;

use super::replay::replay;
use super::stats::WorkerStats;
use super::WorkUnit;

/// A single benchmark worker
///
/// Owns one connection for its whole lifetime and repeatedly pulls a work
/// unit from the shared queue, replays the precomputed request over the
/// connection, and publishes the outcome. A transport failure ends the worker
/// immediately; remaining units stay in the queue for the surviving workers.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Connection source (shared across workers via Arc)
    factory: Arc<dyn ConnectionFactory>,

    /// The precomputed request, replayed verbatim on every call
    request: Bytes,

    /// Shared work queue; `recv() == None` is the only termination signal
    queue: Arc<Mutex<mpsc::Receiver<WorkUnit>>>,

    /// Latency channel (elapsed micros per completed call)
    latency_tx: mpsc::Sender<u64>,

    /// Error channel (one entry per server exception)
    error_tx: mpsc::Sender<ErrorKind>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        factory: Arc<dyn ConnectionFactory>,
        request: Bytes,
        queue: Arc<Mutex<mpsc::Receiver<WorkUnit>>>,
        latency_tx: mpsc::Sender<u64>,
        error_tx: mpsc::Sender<ErrorKind>,
    ) -> Self {
        Self {
            id,
            factory,
            request,
            queue,
            latency_tx,
            error_tx,
        }
    }

    /// Run the worker until the queue closes or a fatal transport error.
    ///
    /// The connection is dropped (closed) on every exit path. The worker's
    /// outcome senders drop with it, which is what lets the outcome channels
    /// close once every worker has stopped writing.
    pub async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::new();
        stats.start();

        let mut conn = match self.factory.connect().await {
            Ok(conn) => conn,
            Err(error) => {
                tracing::error!(worker_id = self.id, %error, "failed to open connection");
                stats.record_fatal(error.to_string());
                stats.stop();
                return stats;
            }
        };
        tracing::debug!(worker_id = self.id, "worker started");

        loop {
            // Hold the queue lock only across the dequeue.
            let unit = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            let Some(unit) = unit else {
                // Queue closed and drained: clean exit.
                break;
            };

            match replay(conn.as_mut(), &self.request).await {
                Ok(CallOutcome::Success { elapsed_micros }) => {
                    stats.record_success();
                    if self.latency_tx.send(elapsed_micros).await.is_err() {
                        tracing::debug!(worker_id = self.id, "latency channel closed, stopping");
                        break;
                    }
                }
                Ok(CallOutcome::Failure { kind }) => {
                    stats.record_failure();
                    if self.error_tx.send(kind).await.is_err() {
                        tracing::debug!(worker_id = self.id, "error channel closed, stopping");
                        break;
                    }
                }
                Err(error) => {
                    tracing::error!(
                        worker_id = self.id,
                        unit = unit.0,
                        %error,
                        "connection failed, worker stopping"
                    );
                    stats.record_fatal(error.to_string());
                    break;
                }
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            completed = stats.completed,
            failures = stats.failures,
            "worker finished"
        );
        stats
    }

    /// Get the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("request_len", &self.request.len())
            .finish()
    }
}
