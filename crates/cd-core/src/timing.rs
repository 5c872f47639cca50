//! Lightweight wall-clock accounting for the phases of a cluster step.
//!
//! Enabled through the `CD_TIMING` environment variable or programmatically.
//! The cluster loop wraps each phase in a [`Timer`] and records into the
//! static accumulators in [`phase`]; the summary goes out through `tracing`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("CD_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        self.enabled.then(|| self.start.elapsed().as_secs_f64())
    }

    /// Stop the timer and add the elapsed time to `acc`.
    pub fn record_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Per-phase accumulators for the cluster step.
pub mod phase {
    use super::AccumulatingTimer;

    pub static STELLAR: AccumulatingTimer = AccumulatingTimer::new();
    pub static GRAVITY: AccumulatingTimer = AccumulatingTimer::new();
    pub static ENCOUNTERS: AccumulatingTimer = AccumulatingTimer::new();
    pub static RADIATION: AccumulatingTimer = AccumulatingTimer::new();
    pub static MASS_LOSS: AccumulatingTimer = AccumulatingTimer::new();
    pub static DISKS: AccumulatingTimer = AccumulatingTimer::new();
    pub static PERSISTENCE: AccumulatingTimer = AccumulatingTimer::new();

    fn all() -> [(&'static str, &'static AccumulatingTimer); 7] {
        [
            ("stellar", &STELLAR),
            ("gravity", &GRAVITY),
            ("encounters", &ENCOUNTERS),
            ("radiation", &RADIATION),
            ("mass_loss", &MASS_LOSS),
            ("disks", &DISKS),
            ("persistence", &PERSISTENCE),
        ]
    }

    pub fn reset_all() {
        for (_, timer) in all() {
            timer.reset();
        }
    }

    /// Emit one `info` line per phase that saw any calls.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        for (label, timer) in all() {
            let count = timer.count();
            if count > 0 {
                tracing::info!(
                    phase = label,
                    calls = count,
                    total_s = timer.total_seconds(),
                    avg_ms = timer.average_seconds() * 1000.0,
                    "phase timing"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let acc = AccumulatingTimer::new();
        acc.record(0.5);
        acc.record(1.5);
        assert_eq!(acc.count(), 2);
        assert!((acc.total_seconds() - 2.0).abs() < 1e-6);
        assert!((acc.average_seconds() - 1.0).abs() < 1e-6);
        acc.reset();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.average_seconds(), 0.0);
    }

    #[test]
    fn enabled_timer_records() {
        enable_timing();
        let acc = AccumulatingTimer::new();
        Timer::start().record_into(&acc);
        assert_eq!(acc.count(), 1);
    }
}
