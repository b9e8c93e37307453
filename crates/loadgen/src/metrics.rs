//! Metrics collection and run reports.

use crate::checks::{FailureClass, Outcome};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tpcc_types::TransactionKind;

/// Highest latency the histograms track; slower samples saturate here.
const MAX_TRACKED_LATENCY_US: u64 = 3_600_000_000;

fn latency_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, MAX_TRACKED_LATENCY_US, 3)
        .expect("constant histogram bounds are valid")
}

struct KindMetrics {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: [AtomicU64; FailureClass::COUNT],
    latency_us: Mutex<Histogram<u64>>,
}

impl KindMetrics {
    fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: Default::default(),
            latency_us: Mutex::new(latency_histogram()),
        }
    }
}

/// Thread-safe collector shared by every virtual user of a run.
pub struct MetricsCollector {
    kinds: [KindMetrics; TransactionKind::COUNT],
    overall_us: Mutex<Histogram<u64>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            kinds: std::array::from_fn(|_| KindMetrics::new()),
            overall_us: Mutex::new(latency_histogram()),
        }
    }

    /// Record one finished iteration.
    pub fn record(&self, kind: TransactionKind, outcome: &Outcome, latency: Duration) {
        let metrics = &self.kinds[kind.index()];
        metrics.attempts.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Outcome::Success => {
                metrics.successes.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Failure(reason) => {
                metrics.failures[reason.class().index()].fetch_add(1, Ordering::Relaxed);
            }
        }

        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        metrics.latency_us.lock().saturating_record(micros);
        self.overall_us.lock().saturating_record(micros);
    }

    /// Attempts recorded so far across all kinds.
    pub fn total_attempts(&self) -> u64 {
        self.kinds
            .iter()
            .map(|k| k.attempts.load(Ordering::Relaxed))
            .sum()
    }

    /// Build a report covering `elapsed` wall-clock time.
    pub fn report(&self, elapsed: Duration, fallbacks: u64) -> LoadReport {
        let kinds = TransactionKind::ALL
            .into_iter()
            .map(|kind| {
                let metrics = &self.kinds[kind.index()];
                let failures_by_class: [u64; FailureClass::COUNT] =
                    std::array::from_fn(|i| metrics.failures[i].load(Ordering::Relaxed));
                let hist = metrics.latency_us.lock();
                KindReport {
                    kind,
                    attempts: metrics.attempts.load(Ordering::Relaxed),
                    successes: metrics.successes.load(Ordering::Relaxed),
                    failures: failures_by_class.iter().sum(),
                    failures_by_class,
                    latency: LatencySummary::from_histogram(&hist),
                }
            })
            .collect();

        LoadReport {
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            kinds,
            latency: LatencySummary::from_histogram(&self.overall_us.lock()),
            selector_fallbacks: fallbacks,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency percentiles in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
}

impl LatencySummary {
    fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }
        Self {
            p50_us: hist.value_at_quantile(0.50),
            p95_us: hist.value_at_quantile(0.95),
            p99_us: hist.value_at_quantile(0.99),
            max_us: hist.max(),
            mean_us: hist.mean(),
        }
    }

    pub fn p50(&self) -> Duration {
        Duration::from_micros(self.p50_us)
    }

    pub fn p95(&self) -> Duration {
        Duration::from_micros(self.p95_us)
    }

    pub fn p99(&self) -> Duration {
        Duration::from_micros(self.p99_us)
    }

    pub fn max(&self) -> Duration {
        Duration::from_micros(self.max_us)
    }
}

/// Per-kind section of a [`LoadReport`].
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: TransactionKind,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    /// Failures indexed by [`FailureClass::index`].
    pub failures_by_class: [u64; FailureClass::COUNT],
    pub latency: LatencySummary,
}

impl KindReport {
    pub fn failures_of(&self, class: FailureClass) -> u64 {
        self.failures_by_class[class.index()]
    }

    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64
        }
    }
}

/// Summary of a finished load run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub elapsed_ms: u64,
    pub kinds: Vec<KindReport>,
    pub latency: LatencySummary,
    /// Selections that matched no kind and fell back to New-Order.
    pub selector_fallbacks: u64,
}

impl LoadReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn kind(&self, kind: TransactionKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    pub fn total_attempts(&self) -> u64 {
        self.kinds.iter().map(|k| k.attempts).sum()
    }

    pub fn total_successes(&self) -> u64 {
        self.kinds.iter().map(|k| k.successes).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.kinds.iter().map(|k| k.failures).sum()
    }

    pub fn failure_rate(&self) -> f64 {
        let attempts = self.total_attempts();
        if attempts == 0 {
            0.0
        } else {
            self.total_failures() as f64 / attempts as f64
        }
    }

    /// Completed iterations per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.total_attempts() as f64 / secs
        } else {
            0.0
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("\n=== Load Run Report ===");
        println!("Duration:       {:.2}s", self.elapsed().as_secs_f64());
        println!("Iterations:     {}", self.total_attempts());
        println!("Successes:      {}", self.total_successes());
        println!(
            "Failures:       {} ({:.2}%)",
            self.total_failures(),
            self.failure_rate() * 100.0
        );
        println!("Throughput:     {:.2} it/s", self.throughput());
        println!(
            "Latency:        p50={:?} p95={:?} p99={:?} max={:?}",
            self.latency.p50(),
            self.latency.p95(),
            self.latency.p99(),
            self.latency.max()
        );
        if self.selector_fallbacks > 0 {
            println!("Fallbacks:      {}", self.selector_fallbacks);
        }

        println!(
            "\n{:<14} {:>9} {:>9} {:>8} {:>8} {:>10} {:>10} {:>10}",
            "kind", "attempts", "ok", "fail", "fail%", "p50", "p95", "p99"
        );
        for k in self.kinds.iter().filter(|k| k.attempts > 0) {
            println!(
                "{:<14} {:>9} {:>9} {:>8} {:>7.2}% {:>10} {:>10} {:>10}",
                k.kind.name(),
                k.attempts,
                k.successes,
                k.failures,
                k.failure_rate() * 100.0,
                format!("{:.1?}", k.latency.p50()),
                format!("{:.1?}", k.latency.p95()),
                format!("{:.1?}", k.latency.p99()),
            );
            if k.failures > 0 {
                let breakdown: Vec<String> = FailureClass::ALL
                    .into_iter()
                    .filter(|c| k.failures_of(*c) > 0)
                    .map(|c| format!("{}={}", c.name(), k.failures_of(c)))
                    .collect();
                println!("{:<14} failures: {}", "", breakdown.join(" "));
            }
        }
        println!("=======================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::FailureReason;

    #[test]
    fn test_counts_by_kind_and_class() {
        let metrics = MetricsCollector::new();
        let ms = Duration::from_millis;

        metrics.record(TransactionKind::NewOrder, &Outcome::Success, ms(10));
        metrics.record(TransactionKind::NewOrder, &Outcome::Success, ms(20));
        metrics.record(
            TransactionKind::NewOrder,
            &Outcome::Failure(FailureReason::Status(500)),
            ms(5),
        );
        metrics.record(
            TransactionKind::Payment,
            &Outcome::Failure(FailureReason::MissingField("payment_amount")),
            ms(7),
        );

        let report = metrics.report(Duration::from_secs(2), 0);
        let new_order = report.kind(TransactionKind::NewOrder).unwrap();
        assert_eq!(new_order.attempts, 3);
        assert_eq!(new_order.successes, 2);
        assert_eq!(new_order.failures, 1);
        assert_eq!(new_order.failures_of(FailureClass::Status), 1);

        let payment = report.kind(TransactionKind::Payment).unwrap();
        assert_eq!(payment.failures_of(FailureClass::Body), 1);

        assert_eq!(report.total_attempts(), 4);
        assert_eq!(metrics.total_attempts(), 4);
        assert!((report.failure_rate() - 0.5).abs() < f64::EPSILON);
        assert!((report.throughput() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = MetricsCollector::new();
        for ms in 1..=100 {
            metrics.record(
                TransactionKind::StockLevel,
                &Outcome::Success,
                Duration::from_millis(ms),
            );
        }

        let report = metrics.report(Duration::from_secs(1), 0);
        let latency = report.kind(TransactionKind::StockLevel).unwrap().latency;
        // hdrhistogram keeps three significant figures.
        assert!(latency.p50().as_millis().abs_diff(50) <= 1);
        assert!(latency.p99().as_millis().abs_diff(99) <= 1);
        assert!(latency.max() >= Duration::from_millis(99));
        assert_eq!(report.latency.p50_us, latency.p50_us);
    }

    #[test]
    fn test_empty_report() {
        let report = MetricsCollector::new().report(Duration::ZERO, 3);
        assert_eq!(report.total_attempts(), 0);
        assert_eq!(report.failure_rate(), 0.0);
        assert_eq!(report.throughput(), 0.0);
        assert_eq!(report.latency, LatencySummary::default());
        assert_eq!(report.selector_fallbacks, 3);
        assert_eq!(report.kinds.len(), TransactionKind::COUNT);
    }
}
