//! Orchestrator execution logic

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};

use crate::channel::ChannelConfig;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::ErrorKind;
use crate::report::BenchReport;
use crate::traits::{ConnectionFactory, RequestBuilder};
use crate::worker::{replay::replay, WorkUnit, WorkerBuilder, WorkerStats};

use super::collector::{collect_errors, collect_latencies};

/// Drives one benchmark run end to end
///
/// Use `OrchestratorBuilder` for construction.
pub struct Orchestrator {
    pub(crate) config: BenchConfig,
    pub(crate) factory: Arc<dyn ConnectionFactory>,
    pub(crate) builder: Arc<dyn RequestBuilder>,
    pub(crate) channels: ChannelConfig,
    pub(crate) preflight: bool,
}

impl Orchestrator {
    /// Get the run configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Probe the target once with the precomputed request.
    ///
    /// Only transport failures abort the run; a server exception still proves
    /// the target is reachable and answering.
    async fn probe(&self, request: &Bytes) -> Result<()> {
        let mut conn = self.factory.connect().await?;
        replay(conn.as_mut(), request).await?;
        Ok(())
    }

    /// Execute the run and return the finished report.
    ///
    /// Phases, in order: precompute the request (exactly once), optional
    /// pre-flight probe, spawn collectors, spawn workers, feed exactly
    /// `requests` work units, close the queue, await every worker, await the
    /// collectors, seal the report.
    pub async fn run(self) -> Result<BenchReport> {
        let request = self.builder.build()?;
        tracing::debug!(bytes = request.len(), "request precomputed");

        if self.preflight {
            self.probe(&request).await?;
            tracing::debug!("pre-flight call answered");
        }

        let requests = self.config.requests;
        let concurrency = self.config.concurrency;

        let (work_tx, work_rx) = mpsc::channel::<WorkUnit>(self.channels.work_buffer);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (latency_tx, latency_rx) = mpsc::channel::<u64>(self.channels.outcome_buffer);
        let (error_tx, error_rx) = mpsc::channel::<ErrorKind>(self.channels.outcome_buffer);

        // Collectors first, so no worker can ever block forever on a full
        // outcome channel.
        let latency_task = tokio::spawn(collect_latencies(latency_rx));
        let error_task = tokio::spawn(collect_errors(error_rx));

        let mut handles = Vec::with_capacity(concurrency);
        for id in 0..concurrency {
            let worker = WorkerBuilder::new(id)
                .factory(Arc::clone(&self.factory))
                .request(request.clone())
                .queue(Arc::clone(&work_rx))
                .latency_tx(latency_tx.clone())
                .error_tx(error_tx.clone())
                .build()?;
            handles.push(tokio::spawn(worker.run()));
        }
        // The workers now hold the only outcome senders and the only queue
        // receivers: both outcome channels close exactly when the last worker
        // exits, and the queue dies with the workers if all of them do.
        drop(latency_tx);
        drop(error_tx);
        drop(work_rx);

        tracing::info!(requests, concurrency, "starting benchmark");

        for seq in 0..requests {
            if work_tx.send(WorkUnit(seq)).await.is_err() {
                tracing::warn!(fed = seq, "every worker exited before the queue drained");
                break;
            }
        }
        // Closing the queue is the workers' only termination signal.
        drop(work_tx);

        // Two-phase shutdown: observe every worker's completion before the
        // collectors can possibly see their channels close.
        let mut worker_stats: Vec<WorkerStats> = Vec::with_capacity(concurrency);
        for handle in handles {
            match handle.await {
                Ok(stats) => worker_stats.push(stats),
                Err(error) => {
                    tracing::error!(%error, "worker task panicked");
                }
            }
        }
        let dead = worker_stats.iter().filter(|stats| stats.is_fatal()).count();
        if dead > 0 {
            tracing::warn!(dead, "workers ended early on connection failures");
        }

        let (samples, duration) = latency_task.await?;
        let errors = error_task.await?;

        let attempted: usize = worker_stats.iter().map(WorkerStats::total_calls).sum();
        tracing::info!(
            completed = samples.len(),
            failures = errors.total(),
            attempted,
            elapsed_secs = duration.as_secs_f64(),
            "benchmark finished"
        );

        Ok(BenchReport::new(
            self.config.addr.clone(),
            concurrency,
            requests,
            samples,
            duration,
            errors,
        ))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("preflight", &self.preflight)
            .finish()
    }
}
