//! Outcome collectors draining the result channels
//!
//! Each collector owns its aggregate exclusively while the run is live and
//! returns it sealed once its channel closes. Both drain to the last item;
//! no outcome is ever dropped.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::metrics::{ErrorHistogram, ErrorKind};

/// Progress is reported every this many completed requests.
const PROGRESS_INTERVAL: usize = 1000;

/// Drain the latency channel until every worker has dropped its sender.
///
/// Returns the sealed sample set (microseconds, unsorted) and the wall-clock
/// duration of the collection window.
pub(crate) async fn collect_latencies(mut rx: mpsc::Receiver<u64>) -> (Vec<u64>, Duration) {
    let started = Instant::now();
    let mut samples = Vec::new();

    while let Some(elapsed_micros) = rx.recv().await {
        samples.push(elapsed_micros);
        if samples.len() % PROGRESS_INTERVAL == 0 {
            println!("Completed {} requests", samples.len());
        }
    }

    println!("Finished {} requests", samples.len());
    println!();
    (samples, started.elapsed())
}

/// Drain the error channel into a histogram, sealed on channel close.
pub(crate) async fn collect_errors(mut rx: mpsc::Receiver<ErrorKind>) -> ErrorHistogram {
    let mut histogram = ErrorHistogram::new();
    while let Some(kind) = rx.recv().await {
        histogram.record(kind);
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latency_collector_drains_everything() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(collect_latencies(rx));

        for micros in [1_500u64, 2_500, 900] {
            tx.send(micros).await.unwrap();
        }
        drop(tx);

        let (samples, duration) = handle.await.unwrap();
        assert_eq!(samples, vec![1_500, 2_500, 900]);
        assert!(duration > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_latency_collector_seals_empty() {
        let (tx, rx) = mpsc::channel::<u64>(1);
        drop(tx);

        let (samples, _duration) = collect_latencies(rx).await;
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_error_collector_tallies_exact_counts() {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(collect_errors(rx));

        for code in [1, 1, 6, 1, 7] {
            tx.send(ErrorKind::from_code(code)).await.unwrap();
        }
        drop(tx);

        let histogram = handle.await.unwrap();
        assert_eq!(histogram.count(ErrorKind::UnknownMethod), 3);
        assert_eq!(histogram.count(ErrorKind::InternalError), 1);
        assert_eq!(histogram.count(ErrorKind::ProtocolError), 1);
        assert_eq!(histogram.total(), 5);
    }

    #[tokio::test]
    async fn test_error_collector_seals_empty() {
        let (tx, rx) = mpsc::channel::<ErrorKind>(1);
        drop(tx);

        let histogram = collect_errors(rx).await;
        assert!(histogram.is_empty());
    }
}
