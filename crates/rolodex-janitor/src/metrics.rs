//! Metrics collection for Janitor operations

use std::time::Duration;

/// Metrics collected during Janitor operations
///
/// Counters accumulate across sweeps until [`JanitorMetrics::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JanitorMetrics {
    /// Entries removed from the registry
    pub evicted: usize,

    /// Expired entries found while in dry-run mode (not removed)
    pub dry_run_candidates: usize,

    /// Entries evicted by the most recent sweep
    pub last_evicted: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Sweeps that failed with a store error
    pub failed_sweeps: usize,

    /// Time spent sweeping
    pub total_runtime: Duration,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entries evicted by one sweep
    pub fn record_eviction(&mut self, count: usize) {
        self.evicted += count;
        self.last_evicted = count;
    }

    /// Record expired entries left in place by a dry run
    pub fn record_dry_run(&mut self, count: usize) {
        self.dry_run_candidates += count;
        self.last_evicted = 0;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self, elapsed: Duration) {
        self.sweep_count += 1;
        self.total_runtime += elapsed;
    }

    /// Record a sweep that did not complete
    pub fn record_failure(&mut self) {
        self.failed_sweeps += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Failed sweeps: {}", self.failed_sweeps),
            format!("Total runtime: {}ms", self.total_runtime.as_millis()),
            format!("Evicted: {}", self.evicted),
        ];
        if self.dry_run_candidates > 0 {
            lines.push(format!("Expired (dry run, kept): {}", self.dry_run_candidates));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = JanitorMetrics::new();
        assert_eq!(metrics.evicted, 0);
        assert_eq!(metrics.sweep_count, 0);
        assert_eq!(metrics.total_runtime, Duration::ZERO);
    }

    #[test]
    fn test_record_eviction() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_eviction(5);
        metrics.record_eviction(2);
        assert_eq!(metrics.evicted, 7);
        assert_eq!(metrics.last_evicted, 2);
    }

    #[test]
    fn test_record_sweep_accumulates_runtime() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_sweep(Duration::from_millis(3));
        metrics.record_sweep(Duration::from_millis(4));
        assert_eq!(metrics.sweep_count, 2);
        assert_eq!(metrics.total_runtime, Duration::from_millis(7));
    }

    #[test]
    fn test_reset() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_eviction(3);
        metrics.record_failure();
        metrics.reset();
        assert_eq!(metrics, JanitorMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_eviction(4);
        metrics.record_sweep(Duration::from_millis(10));
        let summary = metrics.summary();
        assert!(summary.contains("Sweep cycles: 1"));
        assert!(summary.contains("Evicted: 4"));
        assert!(!summary.contains("dry run"));

        metrics.record_dry_run(2);
        assert!(metrics.summary().contains("Expired (dry run, kept): 2"));
    }
}
