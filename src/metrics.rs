// Harness metrics module
//
// Lightweight counters for diagnosing flaky timing in dialog tests

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Driver-level metrics.
///
/// Uses atomic operations for thread-safe tracking without locks. A
/// failing or slow test run can dump these via [`log_summary`](Self::log_summary)
/// to tell a starved UI thread apart from a dialog that genuinely never
/// opened.
#[derive(Debug)]
pub struct Metrics {
    /// Round trips submitted to the UI thread
    pub ui_dispatches: AtomicU64,

    /// Total time callers spent blocked on dispatch round trips, in ms
    pub dispatch_wait_ms: AtomicU64,

    /// Dispatches that came back cancelled
    pub dispatch_cancellations: AtomicU64,

    /// Discovery attempts that found no dialog and retried
    pub discovery_retries: AtomicUsize,

    /// Operations that exhausted their hang-mitigation budget
    pub timeouts: AtomicUsize,

    /// Quiescence waits issued by the verify loops
    pub idle_waits: AtomicU64,

    /// Completed interaction operations (clicks, selections, reads)
    pub interactions: AtomicUsize,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ui_dispatches: AtomicU64::new(0),
            dispatch_wait_ms: AtomicU64::new(0),
            dispatch_cancellations: AtomicU64::new(0),
            discovery_retries: AtomicUsize::new(0),
            timeouts: AtomicUsize::new(0),
            idle_waits: AtomicU64::new(0),
            interactions: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one dispatch round trip and how long the caller blocked.
    pub fn record_dispatch(&self, waited: Duration) {
        self.ui_dispatches.fetch_add(1, Ordering::Relaxed);
        self.dispatch_wait_ms
            .fetch_add(waited.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_dispatch_cancelled(&self) {
        self.dispatch_cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discovery_retry(&self) {
        self.discovery_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_idle_wait(&self) {
        self.idle_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interaction(&self) {
        self.interactions.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since this metrics instance was created.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average caller wait per dispatch round trip, in milliseconds.
    pub fn avg_dispatch_wait_ms(&self) -> f64 {
        let total = self.dispatch_wait_ms.load(Ordering::Relaxed);
        let count = self.ui_dispatches.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log a one-shot summary of everything tracked so far.
    pub fn log_summary(&self) {
        tracing::info!("=== Dialog Driver Metrics ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Dispatches: {} ({} cancelled, avg wait {:.2}ms)",
            self.ui_dispatches.load(Ordering::Relaxed),
            self.dispatch_cancellations.load(Ordering::Relaxed),
            self.avg_dispatch_wait_ms()
        );
        tracing::info!(
            "Discovery: {} retries, {} timeouts, {} idle waits",
            self.discovery_retries.load(Ordering::Relaxed),
            self.timeouts.load(Ordering::Relaxed),
            self.idle_waits.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Interactions completed: {}",
            self.interactions.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
