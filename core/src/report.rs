//! Post-run numeric summary and report rendering

use std::time::Duration;

use crate::metrics::ErrorHistogram;

/// The fixed percentile ladder: reported percentage and index denominator.
/// A non-positive denominator selects the longest observed sample.
const PERCENTILE_LADDER: [(u32, i64); 9] = [
    (50, 2),
    (66, 3),
    (75, 4),
    (80, 5),
    (90, 10),
    (95, 20),
    (98, 50),
    (99, 100),
    (100, -1),
];

/// Aggregate performance report for one finished run
///
/// Built from the sealed collector outputs; the sample set is sorted exactly
/// once on construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct BenchReport {
    addr: String,
    concurrency: usize,
    requested: usize,
    samples: Vec<u64>,
    duration: Duration,
    errors: ErrorHistogram,
}

impl BenchReport {
    /// Seal the collected latency samples (microseconds) into a report.
    ///
    /// Collection order carries no meaning; the percentile ladder is computed
    /// over the sorted set.
    pub fn new(
        addr: impl Into<String>,
        concurrency: usize,
        requested: usize,
        mut samples: Vec<u64>,
        duration: Duration,
        errors: ErrorHistogram,
    ) -> Self {
        samples.sort_unstable();
        Self {
            addr: addr.into(),
            concurrency,
            requested,
            samples,
            duration,
            errors,
        }
    }

    /// Number of successfully completed requests.
    pub fn completed(&self) -> usize {
        self.samples.len()
    }

    /// Requested minus completed; counts both server exceptions and requests
    /// never attempted because a worker died early.
    pub fn failed(&self) -> usize {
        self.requested.saturating_sub(self.completed())
    }

    /// Wall-clock duration of the collection window.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Mean completed requests per second over the collection window.
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.completed() as f64 / secs
        } else {
            0.0
        }
    }

    /// The sealed exception histogram.
    pub fn errors(&self) -> &ErrorHistogram {
        &self.errors
    }

    /// Sample value for one ladder denominator, in milliseconds.
    ///
    /// The index is `len * (k - 1) / k - 1` with integer division, clamped at
    /// zero; a non-positive denominator selects the longest sample. Returns
    /// `None` when no samples were collected.
    pub fn percentile(&self, denominator: i64) -> Option<f64> {
        let len = self.samples.len();
        if len == 0 {
            return None;
        }
        let index = if denominator <= 0 {
            len - 1
        } else {
            let k = denominator as usize;
            (len * (k - 1) / k).saturating_sub(1)
        };
        Some(self.samples[index] as f64 / 1000.0)
    }

    /// Render the summary block, percentile ladder, and exception histogram.
    ///
    /// The percentile section is omitted entirely when nothing completed; the
    /// exception block is omitted when no errors were observed.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{:<24}{}\n", "Server Address:", self.addr));
        out.push('\n');
        out.push_str(&format!(
            "{:<24}{}\n",
            "Concurrency level:", self.concurrency
        ));
        out.push_str(&format!(
            "{:<24}{:.3} seconds\n",
            "Time taken for tests:",
            self.duration.as_secs_f64()
        ));
        out.push_str(&format!(
            "{:<24}{}\n",
            "Complete requests:",
            self.completed()
        ));
        out.push_str(&format!("{:<24}{}\n", "Failed requests:", self.failed()));
        out.push_str(&format!(
            "{:<24}{:.2} [#/sec] (mean)\n",
            "Request per second:",
            self.requests_per_second()
        ));

        if !self.samples.is_empty() {
            out.push('\n');
            out.push_str("Percentage of the requests served within a certain time (ms)\n");
            for (percent, denominator) in PERCENTILE_LADDER {
                if let Some(value) = self.percentile(denominator) {
                    let suffix = if denominator <= 0 {
                        " (longest request)"
                    } else {
                        ""
                    };
                    out.push_str(&format!("{percent:>4}% {value:>8.2}{suffix}\n"));
                }
            }
        }

        if !self.errors.is_empty() {
            out.push('\n');
            out.push_str("Count of the exception replied by server:\n");
            for (kind, count) in self.errors.sorted() {
                out.push_str(&format!("{:<32}{}\n", kind.to_string(), count));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ErrorKind;

    fn report_with_samples(requested: usize, samples: Vec<u64>) -> BenchReport {
        BenchReport::new(
            "127.0.0.1:6000",
            10,
            requested,
            samples,
            Duration::from_secs(2),
            ErrorHistogram::new(),
        )
    }

    #[test]
    fn test_percentile_formula_exact() {
        // 1..=100 milliseconds as microseconds
        let samples: Vec<u64> = (1..=100).map(|ms| ms * 1000).collect();
        let report = report_with_samples(100, samples);

        // len * (k-1) / k - 1: 100*1/2-1 = 49 -> the 50th value
        assert_eq!(report.percentile(2), Some(50.0));
        // 100*99/100-1 = 98 -> the 99th value
        assert_eq!(report.percentile(100), Some(99.0));
        assert_eq!(report.percentile(-1), Some(100.0));
    }

    #[test]
    fn test_hundredth_percentile_is_exact_max() {
        let samples = vec![7_000, 3_000, 9_500, 1_200];
        let report = report_with_samples(4, samples);
        assert_eq!(report.percentile(-1), Some(9.5));
    }

    #[test]
    fn test_ladder_is_monotonic() {
        let samples: Vec<u64> = (0..1000).map(|i| (i * 37) % 90_000 + 100).collect();
        let report = report_with_samples(1000, samples);

        let values: Vec<f64> = PERCENTILE_LADDER
            .iter()
            .filter_map(|(_, denominator)| report.percentile(*denominator))
            .collect();
        assert_eq!(values.len(), PERCENTILE_LADDER.len());
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1], "ladder not monotonic: {values:?}");
        }
    }

    #[test]
    fn test_single_sample_clamps_index() {
        let report = report_with_samples(1, vec![5_000]);
        for (_, denominator) in PERCENTILE_LADDER {
            assert_eq!(report.percentile(denominator), Some(5.0));
        }
    }

    #[test]
    fn test_no_samples_no_percentile_section() {
        let report = report_with_samples(50, Vec::new());
        assert_eq!(report.percentile(2), None);

        let rendered = report.render();
        assert!(!rendered.contains("Percentage of the requests"));
        assert!(rendered.contains("Complete requests:      0"));
        assert!(rendered.contains("Failed requests:        50"));
    }

    #[test]
    fn test_failed_is_requested_minus_completed() {
        let report = report_with_samples(10, vec![1_000; 7]);
        assert_eq!(report.completed(), 7);
        assert_eq!(report.failed(), 3);
    }

    #[test]
    fn test_throughput() {
        let report = report_with_samples(100, vec![2_000; 100]);
        // 100 samples over 2 seconds
        assert!((report.requests_per_second() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_includes_error_block() {
        let mut errors = ErrorHistogram::new();
        for _ in 0..50 {
            errors.record(ErrorKind::UnknownMethod);
        }
        let report = BenchReport::new(
            "127.0.0.1:6000",
            5,
            50,
            Vec::new(),
            Duration::from_secs(1),
            errors,
        );

        let rendered = report.render();
        assert!(rendered.contains("Count of the exception replied by server:"));
        assert!(rendered.contains("ExceptionUnknownMethod"));
        assert!(rendered.contains("50"));
    }

    #[test]
    fn test_render_omits_error_block_when_clean() {
        let report = report_with_samples(4, vec![1_000; 4]);
        assert!(!report.render().contains("exception"));
    }
}
