//! Per-worker statistics

use std::time::{Duration, Instant};

/// Counters tracked by each worker over its lifetime
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Calls that completed with a normal result
    pub completed: usize,

    /// Calls answered with a server exception
    pub failures: usize,

    /// The transport error that ended the worker early, if any
    pub fatal: Option<String>,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time).
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time).
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Record a call that completed normally.
    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Record a call answered with a server exception.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Record the transport error that ended this worker early.
    pub fn record_fatal(&mut self, error: String) {
        self.fatal = Some(error);
    }

    /// Total calls that produced an outcome (completed + failures).
    pub fn total_calls(&self) -> usize {
        self.completed + self.failures
    }

    /// Whether the worker ended on a fatal transport error.
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    /// Elapsed time between start and end (or since start if still running).
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_defaults() {
        let stats = WorkerStats::default();
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failures, 0);
        assert!(stats.fatal.is_none());
        assert!(stats.elapsed().is_none());
    }

    #[test]
    fn test_stats_counting() {
        let mut stats = WorkerStats::new();
        stats.record_success();
        stats.record_success();
        stats.record_failure();

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.total_calls(), 3);
    }

    #[test]
    fn test_stats_fatal() {
        let mut stats = WorkerStats::new();
        assert!(!stats.is_fatal());

        stats.record_fatal("broken pipe".to_string());
        assert!(stats.is_fatal());
        assert_eq!(stats.fatal.as_deref(), Some("broken pipe"));
    }

    #[test]
    fn test_stats_start_stop() {
        let mut stats = WorkerStats::new();
        stats.start();
        assert!(stats.elapsed().is_some());

        std::thread::sleep(Duration::from_millis(5));
        stats.stop();

        assert!(stats.elapsed().unwrap() >= Duration::from_millis(5));
    }
}
